//! Azure Blob Storage adapter for the destination store
//!
//! Talks to the Azure Blob REST API directly via `reqwest`:
//! - [`auth::AzureAuth`] - Shared Key or SAS token credentials, resolved
//!   from the run configuration
//! - [`client::BlobClient`] - the [`DestinationStore`] port implementation
//!   (prefix listing with pagination, Put Blob upload)
//! - [`list`] - List Blobs XML response parsing
//!
//! [`DestinationStore`]: spbsync_core::ports::DestinationStore

pub mod auth;
pub mod client;
pub mod list;

pub use auth::AzureAuth;
pub use client::BlobClient;
