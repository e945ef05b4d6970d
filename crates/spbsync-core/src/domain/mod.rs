//! Domain entities for a synchronization run
//!
//! All entities here are created during a run and discarded with it;
//! SharePoint and Blob Storage hold the only durable state.

pub mod errors;
pub mod remote_file;

pub use errors::{StoreSide, SyncError};
pub use remote_file::{FileSource, RemoteFile};
