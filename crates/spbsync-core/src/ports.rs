//! Store ports (driven/secondary ports)
//!
//! Trait interfaces the adapter crates implement: `spbsync-graph` for the
//! SharePoint side and `spbsync-blob` for Azure Blob Storage. The
//! orchestrator and its tests depend only on these traits.
//!
//! Methods return [`SyncError`] rather than `anyhow::Result` because the
//! orchestrator's control flow depends on the error class: listing errors
//! abort the run, per-task transfer errors are isolated and counted.

use bytes::Bytes;

use crate::domain::{RemoteFile, SyncError};

/// Port for the source document store (SharePoint via Microsoft Graph)
#[async_trait::async_trait]
pub trait SourceStore: Send + Sync {
    /// Lists every file directly inside `folder_path` (non-recursive),
    /// with last-modified timestamps in UTC.
    ///
    /// Pagination is resolved internally; the returned sequence is fully
    /// materialized. Errors: `Auth` for rejected credentials, `NotFound`
    /// when the folder does not resolve, `Transient` for network or
    /// timeout conditions.
    async fn list_files(&self, folder_path: &str) -> Result<Vec<RemoteFile>, SyncError>;

    /// Downloads a file's bytes as an opaque stream, no transformation.
    ///
    /// Fails with `SourceRead` carrying the underlying transport error.
    async fn download(&self, file: &RemoteFile) -> Result<Bytes, SyncError>;
}

/// Port for the destination blob store (Azure Blob Storage)
#[async_trait::async_trait]
pub trait DestinationStore: Send + Sync {
    /// Lists blobs whose path starts with `prefix`, with last-modified
    /// timestamps in UTC. Same error taxonomy as the source listing;
    /// `NotFound` covers a missing container.
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<RemoteFile>, SyncError>;

    /// Uploads `data` to `blob_path`, overwriting any existing blob.
    ///
    /// Fails with `DestinationWrite` carrying the underlying transport
    /// error.
    async fn upload(&self, blob_path: &str, data: Bytes) -> Result<(), SyncError>;
}
