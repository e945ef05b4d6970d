//! Microsoft Graph API client
//!
//! Typed HTTP client for the Graph calls the sync needs: resolving a
//! SharePoint site from its URL, finding the site's default document
//! library drive, listing the direct children of a folder, and
//! downloading file content. Handles bearer authentication, JSON
//! deserialization, and `@odata.nextLink` pagination.

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use spbsync_core::domain::{StoreSide, SyncError};

/// Base URL for Microsoft Graph API v1.0
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

// ============================================================================
// Graph API response types
// ============================================================================

/// Response from the site-by-path endpoint
#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
}

/// Response from the default-drive endpoint
#[derive(Debug, Deserialize)]
struct DriveResponse {
    id: String,
}

/// One page of a folder children listing
#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    #[serde(default)]
    value: Vec<DriveItem>,

    /// URL of the next page, present when the listing is paginated
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// A drive item from a children listing
///
/// Maps to the DriveItem resource type; fields use camelCase to match
/// the JSON format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Unique identifier of the item within the drive
    pub id: String,

    /// File or folder name
    #[serde(default)]
    pub name: String,

    /// Size in bytes (files only)
    pub size: Option<u64>,

    /// Last modified time in ISO 8601; Graph always reports UTC
    pub last_modified_date_time: Option<DateTime<Utc>>,

    /// File facet (present if the item is a file)
    pub file: Option<FileFacet>,

    /// Folder facet (present if the item is a folder)
    pub folder: Option<FolderFacet>,
}

impl DriveItem {
    /// True when the item is a file rather than a folder.
    pub fn is_file(&self) -> bool {
        self.file.is_some() && self.folder.is_none()
    }
}

/// File facet; its presence marks the item as a file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    /// MIME type reported by the store
    pub mime_type: Option<String>,
}

/// Folder facet; its presence marks the item as a folder
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    /// Number of immediate children
    pub child_count: Option<u64>,
}

// ============================================================================
// GraphClient
// ============================================================================

/// HTTP client for Microsoft Graph API calls
///
/// Wraps `reqwest::Client` with bearer authentication and base URL
/// construction. Listing and resolution methods classify HTTP failures
/// into the run-fatal [`SyncError`] taxonomy; download returns
/// `anyhow::Result` and is mapped at the provider boundary.
#[derive(Debug)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GraphClient {
    /// Creates a new GraphClient with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: GRAPH_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Creates a new GraphClient with a custom base URL (useful for testing).
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Returns the base URL for API requests.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a SharePoint site URL to its Graph site ID.
    ///
    /// `https://contoso.sharepoint.com/sites/Finance` becomes
    /// `GET /sites/contoso.sharepoint.com:/sites/Finance`.
    pub async fn resolve_site(&self, site_url: &str) -> Result<String, SyncError> {
        let endpoint = site_endpoint(site_url)?;
        debug!(site = site_url, "Resolving SharePoint site");

        let site: SiteResponse = self
            .get_json(format!("{}{}", self.base_url, endpoint), site_url)
            .await?;

        debug!(site_id = %site.id, "Resolved site");
        Ok(site.id)
    }

    /// Returns the ID of the site's default document library drive.
    pub async fn default_drive(&self, site_id: &str) -> Result<String, SyncError> {
        debug!(site_id, "Resolving default drive");

        let drive: DriveResponse = self
            .get_json(format!("{}/sites/{}/drive", self.base_url, site_id), site_id)
            .await?;

        debug!(drive_id = %drive.id, "Resolved drive");
        Ok(drive.id)
    }

    /// Lists the direct children of a folder, following pagination.
    ///
    /// Returns every item on every page; the caller filters folders out.
    /// The sequence is fully materialized before returning, so pagination
    /// never surfaces to the planner.
    pub async fn list_children(
        &self,
        drive_id: &str,
        folder_path: &str,
    ) -> Result<Vec<DriveItem>, SyncError> {
        let folder = folder_path.trim_matches('/');
        let mut url = if folder.is_empty() {
            format!("{}/drives/{}/root/children", self.base_url, drive_id)
        } else {
            format!(
                "{}/drives/{}/root:/{}:/children",
                self.base_url, drive_id, folder
            )
        };

        let mut items = Vec::new();
        loop {
            let page: ChildrenResponse = self.get_json(url, folder_path).await?;
            debug!(count = page.value.len(), "Fetched listing page");
            items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!(total = items.len(), folder = folder_path, "Folder listing complete");
        Ok(items)
    }

    /// Downloads a file's raw bytes.
    ///
    /// `GET /drives/{drive}/items/{id}/content` returns a redirect to the
    /// actual download URL, which reqwest follows automatically.
    pub async fn download_item(&self, drive_id: &str, item_id: &str) -> Result<Bytes> {
        let url = format!(
            "{}/drives/{}/items/{}/content",
            self.base_url, drive_id, item_id
        );
        debug!(item_id, "Downloading file content");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to send download request")?
            .error_for_status()
            .context("Download request returned error status")?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read download response body")?;

        debug!(item_id, size = bytes.len(), "Downloaded file content");
        Ok(bytes)
    }

    /// GETs a Graph URL and deserializes the JSON body, classifying
    /// failures into the run-fatal taxonomy.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        resource: &str,
    ) -> Result<T, SyncError> {
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SyncError::Transient {
                side: StoreSide::Source,
                message: format!("request to '{resource}' failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::from_status(
                StoreSide::Source,
                status.as_u16(),
                resource,
                &body,
            ));
        }

        response.json::<T>().await.map_err(|e| SyncError::Transient {
            side: StoreSide::Source,
            message: format!("malformed response from '{resource}': {e}"),
        })
    }
}

/// Builds the site-by-path Graph endpoint from a SharePoint site URL.
fn site_endpoint(site_url: &str) -> Result<String, SyncError> {
    let url = url::Url::parse(site_url)
        .map_err(|e| SyncError::Config(format!("SITE_URL '{site_url}' is not a valid URL: {e}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| SyncError::Config(format!("SITE_URL '{site_url}' has no host")))?;

    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        Ok(format!("/sites/{host}"))
    } else {
        Ok(format!("/sites/{host}:{path}"))
    }
}
