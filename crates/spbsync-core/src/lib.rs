//! spbsync Core - Domain logic for the SharePoint → Azure Blob synchronizer
//!
//! This crate contains the provider-independent heart of the tool:
//! - **Domain entities** - `RemoteFile`, `SyncTask`, the `SyncError` taxonomy
//! - **Rule set** - ordered filename-pattern routing rules (`RuleSet`)
//! - **Sync planner** - the Upload/Skip decision engine (`plan::build_plan`)
//! - **Port definitions** - traits the store adapters implement
//!   (`SourceStore`, `DestinationStore`)
//! - **Configuration** - the immutable `Config` read once from the environment
//!
//! # Architecture
//!
//! The domain module contains pure logic with no HTTP dependencies.
//! Ports define trait interfaces that the `spbsync-graph` (SharePoint)
//! and `spbsync-blob` (Azure Blob Storage) adapter crates implement.
//! The CLI crate wires everything into a one-shot run.

pub mod config;
pub mod domain;
pub mod plan;
pub mod ports;
pub mod rules;
