//! Microsoft Graph adapter for the SharePoint source store
//!
//! Provides:
//! - [`auth::GraphAuth`] - OAuth2 client-credentials token acquisition
//!   against the Microsoft identity platform
//! - [`client::GraphClient`] - typed HTTP client for the Graph API
//!   (site/drive resolution, folder listing with pagination, download)
//! - [`provider::SharePointProvider`] - the [`SourceStore`] port
//!   implementation consumed by the orchestrator
//!
//! [`SourceStore`]: spbsync_core::ports::SourceStore

pub mod auth;
pub mod client;
pub mod provider;

pub use auth::{GraphAuth, Tokens};
pub use client::GraphClient;
pub use provider::SharePointProvider;
