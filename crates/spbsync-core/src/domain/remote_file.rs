//! Remote file metadata as returned by the store listings

use chrono::{DateTime, Utc};

/// Which store a listing entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    /// A file in the SharePoint document library
    SharePoint,
    /// An existing blob in the destination container
    Blob,
}

/// A file or blob observed in a remote listing
///
/// Produced by the listing calls, consumed by the planner, and discarded
/// at the end of the run. For SharePoint entries `name` is the bare
/// filename and `id` the drive-item identifier used for download; for
/// blob entries `name` is the full blob path within the container.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Store-specific handle (drive-item id or blob path)
    pub id: String,
    /// Filename (source) or full blob path (destination)
    pub name: String,
    /// Last modification time, always normalized to UTC
    pub last_modified: DateTime<Utc>,
    /// Originating store
    pub source: FileSource,
    /// Size in bytes, when the listing reports one
    pub size: Option<u64>,
}

impl RemoteFile {
    /// Convenience constructor for a SharePoint listing entry.
    pub fn sharepoint(
        id: impl Into<String>,
        name: impl Into<String>,
        last_modified: DateTime<Utc>,
        size: Option<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_modified,
            source: FileSource::SharePoint,
            size,
        }
    }

    /// Convenience constructor for a destination blob entry.
    pub fn blob(path: impl Into<String>, last_modified: DateTime<Utc>, size: Option<u64>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            name: path,
            last_modified,
            source: FileSource::Blob,
            size,
        }
    }
}
