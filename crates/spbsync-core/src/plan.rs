//! Sync planner - the Upload/Skip decision engine
//!
//! Joins the source listing with the destination index by matched target
//! path. A file is uploaded iff no blob exists at the computed destination
//! path, or the existing blob is strictly older than the source file.
//! Equal timestamps skip, which is what makes repeated runs idempotent.
//! All timestamps are `DateTime<Utc>` by construction, so the comparison
//! can never be skewed by an ambient timezone.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::RemoteFile;
use crate::rules::RuleSet;

/// What to do with one matched source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Transfer the file to the destination path
    Upload,
    /// Destination is current; record and move on
    Skip,
}

/// One planned unit of work, derived fresh each run
#[derive(Debug, Clone)]
pub struct SyncTask {
    /// The source file this task transfers (or skips)
    pub source_file: RemoteFile,
    /// Full blob path the file routes to: `{target_folder}/{filename}`
    pub destination_path: String,
    /// The planner's decision for this file
    pub action: SyncAction,
}

/// Computes the destination blob path for a routed file.
///
/// Deterministic in `(target_folder, filename)`; a trailing slash on the
/// configured folder does not produce a double separator.
pub fn destination_path(target_folder: &str, filename: &str) -> String {
    format!("{}/{}", target_folder.trim_end_matches('/'), filename)
}

/// Builds the task list for one run.
///
/// Source files with no matching rule are excluded entirely (they produce
/// no task). `dest_index` maps full blob paths to their last-modified
/// times and is built once from the destination listing before dispatch;
/// it is never consulted again after planning. Output order is
/// unspecified - tasks are independent and dispatched concurrently.
pub fn build_plan(
    sources: &[RemoteFile],
    rules: &RuleSet,
    dest_index: &HashMap<String, DateTime<Utc>>,
) -> Vec<SyncTask> {
    let mut tasks = Vec::new();

    for file in sources {
        let Some(target_folder) = rules.match_target(&file.name) else {
            debug!(file = %file.name, "No rule matches, excluding from sync");
            continue;
        };

        let dest = destination_path(target_folder, &file.name);
        let action = match dest_index.get(&dest) {
            None => {
                debug!(file = %file.name, blob = %dest, "No destination blob, scheduling upload");
                SyncAction::Upload
            }
            Some(blob_modified) if file.last_modified > *blob_modified => {
                debug!(
                    file = %file.name,
                    blob = %dest,
                    source_modified = %file.last_modified,
                    blob_modified = %blob_modified,
                    "Source is newer, scheduling upload"
                );
                SyncAction::Upload
            }
            Some(blob_modified) => {
                debug!(
                    file = %file.name,
                    blob = %dest,
                    source_modified = %file.last_modified,
                    blob_modified = %blob_modified,
                    "Destination is current, skipping"
                );
                SyncAction::Skip
            }
        };

        tasks.push(SyncTask {
            source_file: file.clone(),
            destination_path: dest,
            action,
        });
    }

    tasks
}
