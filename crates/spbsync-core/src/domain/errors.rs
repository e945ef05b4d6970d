//! Error taxonomy for a synchronization run
//!
//! Configuration and listing errors abort the whole run (nothing can be
//! planned without both listings); per-task transfer errors are caught at
//! the worker boundary, recorded, and surfaced only in the final summary.

use std::fmt;

use thiserror::Error;

/// Which side of the transfer an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSide {
    /// The SharePoint document library being read
    Source,
    /// The Azure Blob Storage container being written
    Destination,
}

impl fmt::Display for StoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSide::Source => write!(f, "source"),
            StoreSide::Destination => write!(f, "destination"),
        }
    }
}

/// Errors that can occur during a synchronization run
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad or missing configuration, including invalid rule patterns.
    /// Raised before any network I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials rejected by the source or destination store
    #[error("{side} rejected credentials: {message}")]
    Auth { side: StoreSide, message: String },

    /// Folder or container does not resolve
    #[error("{side} path not found: {path}")]
    NotFound { side: StoreSide, path: String },

    /// Network or timeout condition while listing; fatal for the run
    #[error("transient {side} error: {message}")]
    Transient { side: StoreSide, message: String },

    /// Per-task download failure; isolated, does not abort sibling tasks
    #[error("failed to read '{name}' from source: {message}")]
    SourceRead { name: String, message: String },

    /// Per-task upload failure; isolated, does not abort sibling tasks
    #[error("failed to write '{path}' to destination: {message}")]
    DestinationWrite { path: String, message: String },
}

impl SyncError {
    /// Classifies an HTTP status from a listing or metadata call into the
    /// run-fatal part of the taxonomy.
    ///
    /// 401/403 map to credential rejection, 404 to a missing folder or
    /// container, everything else to a transient transport condition.
    pub fn from_status(side: StoreSide, status: u16, path: &str, detail: &str) -> Self {
        match status {
            401 | 403 => SyncError::Auth {
                side,
                message: format!("HTTP {status}: {detail}"),
            },
            404 => SyncError::NotFound {
                side,
                path: path.to_string(),
            },
            _ => SyncError::Transient {
                side,
                message: format!("HTTP {status} for '{path}': {detail}"),
            },
        }
    }

    /// True for errors that abort the run before or during listing.
    /// Per-task transfer errors are not fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SyncError::SourceRead { .. } | SyncError::DestinationWrite { .. }
        )
    }

    /// Process exit code the CLI maps this error to.
    ///
    /// Configuration problems exit with 2, auth/listing failures with 1.
    /// Per-task errors never surface as an exit code; a completed run exits 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_) => 2,
            _ if self.is_fatal() => 1,
            _ => 0,
        }
    }
}
