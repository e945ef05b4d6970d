//! Azure Blob REST API client
//!
//! Implements the two operations the destination port needs: List Blobs
//! with a prefix filter (building the destination index) and Put Blob
//! (Block Blob upload). Requests are signed with Shared Key when an
//! account key is configured; with SAS auth the token rides on the URL.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info};

use spbsync_core::config::StorageIdentity;
use spbsync_core::domain::{RemoteFile, StoreSide, SyncError};
use spbsync_core::ports::DestinationStore;

use crate::auth::{AzureAuth, ResolvedAccount};
use crate::list::parse_blob_list;

/// Azure REST API version used for all requests
const AZURE_API_VERSION: &str = "2023-11-03";

/// Percent-encoding set for blob paths: everything except unreserved
/// characters and '/' (Azure expects '/' unencoded in blob paths).
const BLOB_ENCODE_SET: percent_encoding::AsciiSet = percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

type HmacSha256 = Hmac<Sha256>;

/// Destination container reached through the Azure Blob REST API
pub struct BlobClient {
    client: reqwest::Client,
    account: String,
    container: String,
    base_url: String,
    auth: AzureAuth,
}

impl BlobClient {
    /// Builds a client for the configured storage identity and container.
    pub fn from_identity(storage: &StorageIdentity, container: &str) -> Result<Self, SyncError> {
        let resolved = ResolvedAccount::from_identity(storage)?;

        info!(
            account = %resolved.account,
            container,
            "Destination blob client initialized"
        );

        Ok(Self {
            client: reqwest::Client::new(),
            account: resolved.account,
            container: container.to_string(),
            base_url: resolved.base_url,
            auth: resolved.auth,
        })
    }

    /// Builds a client against an explicit endpoint (useful for testing).
    pub fn with_base_url(
        account: impl Into<String>,
        container: impl Into<String>,
        base_url: impl Into<String>,
        auth: AzureAuth,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            account: account.into(),
            container: container.into(),
            base_url: base_url.into(),
            auth,
        }
    }

    /// Current UTC time in the RFC 1123 form the x-ms-date header expects.
    fn rfc1123_date() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Full URL for a blob, percent-encoding the path but not '/'.
    fn blob_url(&self, blob_path: &str) -> String {
        let encoded = percent_encoding::utf8_percent_encode(blob_path, &BLOB_ENCODE_SET);
        format!("{}/{}/{}", self.base_url, self.container, encoded)
    }

    /// Appends the SAS token to a URL when using SAS auth.
    fn maybe_append_sas(&self, url: &str) -> String {
        match &self.auth {
            AzureAuth::SasToken { token } => {
                if url.contains('?') {
                    format!("{url}&{token}")
                } else {
                    format!("{url}?{token}")
                }
            }
            AzureAuth::SharedKey { .. } => url.to_string(),
        }
    }

    /// HMAC-SHA256 over the string-to-sign, as a SharedKey header value.
    fn shared_key_header(&self, key_bytes: &[u8], string_to_sign: &str) -> Result<String, SyncError> {
        let mut mac = HmacSha256::new_from_slice(key_bytes)
            .map_err(|e| SyncError::Config(format!("storage key is unusable for HMAC: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{}", self.account, signature))
    }

    /// Signs a blob-level request (Put Blob) using Shared Key auth.
    ///
    /// The string-to-sign is the standard Shared Key format: VERB, the
    /// standard headers (only Content-Length and Content-Type carry
    /// values here), canonicalized x-ms-* headers, and the canonicalized
    /// resource. The un-encoded blob path goes into the resource.
    fn sign_blob_request(
        &self,
        method: &str,
        blob_path: &str,
        content_length: usize,
        content_type: &str,
        date: &str,
        extra_ms_headers: &[(&str, &str)],
    ) -> Result<String, SyncError> {
        let key_bytes = match &self.auth {
            AzureAuth::SharedKey { key_bytes } => key_bytes,
            AzureAuth::SasToken { .. } => {
                return Err(SyncError::Config(
                    "cannot sign requests with SAS token auth".to_string(),
                ))
            }
        };

        let content_length_str = if content_length == 0 {
            String::new()
        } else {
            content_length.to_string()
        };

        let mut ms_headers: Vec<(String, String)> = vec![
            ("x-ms-date".to_string(), date.to_string()),
            ("x-ms-version".to_string(), AZURE_API_VERSION.to_string()),
        ];
        for (k, v) in extra_ms_headers {
            ms_headers.push((k.to_lowercase(), v.to_string()));
        }
        ms_headers.sort_by(|a, b| a.0.cmp(&b.0));
        let canonicalized_headers = ms_headers
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join("\n");

        let canonicalized_resource =
            format!("/{}/{}/{}", self.account, self.container, blob_path);

        let string_to_sign = format!(
            "{method}\n\n\n{content_length_str}\n\n{content_type}\n\n\n\n\n\n\n{canonicalized_headers}\n{canonicalized_resource}"
        );

        self.shared_key_header(key_bytes, &string_to_sign)
    }

    /// Signs a container-level request (List Blobs) using Shared Key auth.
    ///
    /// The canonicalized resource is the container followed by the query
    /// parameters sorted by key, one per line as `key:value`.
    fn sign_container_request(
        &self,
        method: &str,
        date: &str,
        query_params: &[(&str, &str)],
    ) -> Result<String, SyncError> {
        let key_bytes = match &self.auth {
            AzureAuth::SharedKey { key_bytes } => key_bytes,
            AzureAuth::SasToken { .. } => {
                return Err(SyncError::Config(
                    "cannot sign requests with SAS token auth".to_string(),
                ))
            }
        };

        let ms_headers = format!("x-ms-date:{date}\nx-ms-version:{AZURE_API_VERSION}");

        let mut canonicalized_resource = format!("/{}/{}", self.account, self.container);
        let mut sorted = query_params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        for (k, v) in &sorted {
            canonicalized_resource.push_str(&format!("\n{}:{}", k.to_lowercase(), v));
        }

        let string_to_sign = format!(
            "{method}\n\n\n\n\n\n\n\n\n\n\n\n{ms_headers}\n{canonicalized_resource}"
        );

        self.shared_key_header(key_bytes, &string_to_sign)
    }

    /// Fetches one List Blobs page as raw XML.
    async fn list_page(&self, prefix: &str, marker: Option<&str>) -> Result<String, SyncError> {
        let encoded_prefix = percent_encoding::utf8_percent_encode(prefix, &BLOB_ENCODE_SET);
        let mut url = format!(
            "{}/{}?restype=container&comp=list&prefix={}",
            self.base_url, self.container, encoded_prefix
        );
        if let Some(m) = marker {
            url.push_str("&marker=");
            url.push_str(&percent_encoding::utf8_percent_encode(m, &BLOB_ENCODE_SET).to_string());
        }

        let date = Self::rfc1123_date();
        let mut req = self
            .client
            .get(self.maybe_append_sas(&url))
            .header("x-ms-date", &date)
            .header("x-ms-version", AZURE_API_VERSION);

        if let AzureAuth::SharedKey { .. } = &self.auth {
            let mut query_params = vec![
                ("comp", "list"),
                ("prefix", prefix),
                ("restype", "container"),
            ];
            if let Some(m) = marker {
                query_params.push(("marker", m));
            }
            req = req.header(
                "Authorization",
                self.sign_container_request("GET", &date, &query_params)?,
            );
        }

        let resp = req.send().await.map_err(|e| SyncError::Transient {
            side: StoreSide::Destination,
            message: format!("blob listing request failed: {e}"),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::from_status(
                StoreSide::Destination,
                status.as_u16(),
                &self.container,
                &body,
            ));
        }

        resp.text().await.map_err(|e| SyncError::Transient {
            side: StoreSide::Destination,
            message: format!("failed to read blob listing body: {e}"),
        })
    }
}

#[async_trait::async_trait]
impl DestinationStore for BlobClient {
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<RemoteFile>, SyncError> {
        let mut blobs = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let body = self.list_page(prefix, marker.as_deref()).await?;
            let page = parse_blob_list(&body);
            debug!(prefix, count = page.blobs.len(), "Fetched blob listing page");

            blobs.extend(
                page.blobs
                    .into_iter()
                    .map(|b| RemoteFile::blob(b.name, b.last_modified, b.size)),
            );

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        info!(prefix, blobs = blobs.len(), "Listed destination prefix");
        Ok(blobs)
    }

    async fn upload(&self, blob_path: &str, data: Bytes) -> Result<(), SyncError> {
        let url = self.blob_url(blob_path);
        let date = Self::rfc1123_date();
        let content_type = "application/octet-stream";

        let write_err = |message: String| SyncError::DestinationWrite {
            path: blob_path.to_string(),
            message,
        };

        let mut req = self
            .client
            .put(self.maybe_append_sas(&url))
            .header("x-ms-date", &date)
            .header("x-ms-version", AZURE_API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("Content-Type", content_type)
            .body(data.clone());

        if let AzureAuth::SharedKey { .. } = &self.auth {
            let auth_header = self
                .sign_blob_request(
                    "PUT",
                    blob_path,
                    data.len(),
                    content_type,
                    &date,
                    &[("x-ms-blob-type", "BlockBlob")],
                )
                .map_err(|e| write_err(e.to_string()))?;
            req = req.header("Authorization", auth_header);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| write_err(format!("upload request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(write_err(format!("HTTP {status}: {body}")));
        }

        debug!(blob = blob_path, size = data.len(), "Uploaded blob");
        Ok(())
    }
}
