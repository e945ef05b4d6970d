//! SharePoint source store implementation
//!
//! Binds a [`GraphClient`] to a specific document library drive and
//! exposes it through the [`SourceStore`] port. Connection (site and
//! drive resolution) happens once, up front, so listing and download
//! calls carry no resolution latency.

use bytes::Bytes;
use tracing::{info, warn};

use spbsync_core::domain::{RemoteFile, SyncError};
use spbsync_core::ports::SourceStore;

use crate::client::GraphClient;

/// SharePoint document library reached through Microsoft Graph
#[derive(Debug)]
pub struct SharePointProvider {
    client: GraphClient,
    drive_id: String,
}

impl SharePointProvider {
    /// Resolves the site and its default document library drive.
    ///
    /// Fails fast when the site URL does not resolve or the credentials
    /// are rejected, before any file work starts.
    pub async fn connect(client: GraphClient, site_url: &str) -> Result<Self, SyncError> {
        let site_id = client.resolve_site(site_url).await?;
        let drive_id = client.default_drive(&site_id).await?;

        info!(site = site_url, drive_id = %drive_id, "Connected to SharePoint site");
        Ok(Self { client, drive_id })
    }

    /// Builds a provider against an already-known drive (useful for testing).
    pub fn with_drive(client: GraphClient, drive_id: impl Into<String>) -> Self {
        Self {
            client,
            drive_id: drive_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl SourceStore for SharePointProvider {
    async fn list_files(&self, folder_path: &str) -> Result<Vec<RemoteFile>, SyncError> {
        let items = self.client.list_children(&self.drive_id, folder_path).await?;

        let mut files = Vec::new();
        for item in items {
            if !item.is_file() {
                continue;
            }
            match item.last_modified_date_time {
                Some(modified) => {
                    files.push(RemoteFile::sharepoint(item.id, item.name, modified, item.size));
                }
                None => {
                    // Cannot compare against the destination without a
                    // timestamp; leave the file for a later run.
                    warn!(name = %item.name, "File has no last-modified timestamp, excluding");
                }
            }
        }

        info!(folder = folder_path, files = files.len(), "Listed source folder");
        Ok(files)
    }

    async fn download(&self, file: &RemoteFile) -> Result<Bytes, SyncError> {
        self.client
            .download_item(&self.drive_id, &file.id)
            .await
            .map_err(|e| SyncError::SourceRead {
                name: file.name.clone(),
                message: format!("{e:#}"),
            })
    }
}
