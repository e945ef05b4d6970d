//! Run orchestrator
//!
//! One pass: list the source folder, build the destination index from one
//! listing per distinct target folder, plan Upload/Skip per file, then
//! dispatch uploads through a bounded worker pool. A failed transfer is
//! counted and logged; it never stops the other workers or the run.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use spbsync_core::config::Config;
use spbsync_core::domain::{RemoteFile, StoreSide, SyncError};
use spbsync_core::plan::{build_plan, SyncAction, SyncTask};
use spbsync_core::ports::{DestinationStore, SourceStore};

use spbsync_blob::BlobClient;
use spbsync_graph::{GraphAuth, GraphClient, SharePointProvider};

/// Counts for one completed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Files transferred to the destination
    pub uploaded: usize,
    /// Files whose destination blob was already current
    pub skipped: usize,
    /// Files whose transfer failed (run still completes)
    pub failed: usize,
}

impl RunSummary {
    /// Total files the run handled.
    pub fn total(&self) -> usize {
        self.uploaded + self.skipped + self.failed
    }
}

/// Connects both stores and performs one sync pass.
pub async fn run(config: &Config) -> Result<RunSummary, SyncError> {
    let auth = GraphAuth::new(&config.tenant, &config.client_id, &config.client_secret)?;
    let tokens = auth.acquire_token().await?;

    let client = GraphClient::new(tokens.access_token);
    let source = SharePointProvider::connect(client, &config.site_url).await?;
    let destination = BlobClient::from_identity(&config.storage, &config.container)?;

    run_with_stores(config, Arc::new(source), Arc::new(destination)).await
}

/// One sync pass over already-connected stores.
pub async fn run_with_stores(
    config: &Config,
    source: Arc<dyn SourceStore>,
    destination: Arc<dyn DestinationStore>,
) -> Result<RunSummary, SyncError> {
    let files = source.list_files(&config.folder_path).await?;
    let listed = files.len();

    let mut matched: Vec<RemoteFile> = files
        .into_iter()
        .filter(|f| config.rules.match_target(&f.name).is_some())
        .collect();
    info!(
        listed,
        matched = matched.len(),
        unmatched = listed - matched.len(),
        "Applied filename routing rules"
    );

    if let Some(cap) = config.max_files {
        if matched.len() > cap {
            warn!(cap, matched = matched.len(), "File cap reached, deferring the rest to the next run");
            matched.truncate(cap);
        }
    }

    let dest_index = build_destination_index(config, destination.as_ref()).await?;
    let plan = build_plan(&matched, &config.rules, &dest_index);

    let semaphore = Arc::new(Semaphore::new(config.worker_count));
    let mut summary = RunSummary::default();
    let mut handles = Vec::new();

    for task in plan {
        match task.action {
            SyncAction::Skip => summary.skipped += 1,
            SyncAction::Upload => {
                let source = Arc::clone(&source);
                let destination = Arc::clone(&destination);
                let semaphore = Arc::clone(&semaphore);
                handles.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|_| {
                        SyncError::Transient {
                            side: StoreSide::Source,
                            message: "worker pool shut down early".to_string(),
                        }
                    })?;
                    transfer(source.as_ref(), destination.as_ref(), &task).await
                }));
            }
        }
    }

    for handle in handles {
        match handle.await {
            Ok(Ok(())) => summary.uploaded += 1,
            Ok(Err(e)) => {
                error!("{e}");
                summary.failed += 1;
            }
            Err(e) => {
                error!(error = %e, "Transfer task panicked");
                summary.failed += 1;
            }
        }
    }

    info!(
        uploaded = summary.uploaded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run complete"
    );
    Ok(summary)
}

/// Lists each distinct target folder once and merges the results into a
/// blob-path to last-modified map.
async fn build_destination_index(
    config: &Config,
    destination: &dyn DestinationStore,
) -> Result<HashMap<String, DateTime<Utc>>, SyncError> {
    let mut index = HashMap::new();
    for folder in config.rules.target_folders() {
        let prefix = format!("{}/", folder.trim_end_matches('/'));
        for blob in destination.list_blobs(&prefix).await? {
            index.insert(blob.name, blob.last_modified);
        }
    }
    info!(blobs = index.len(), "Destination index built");
    Ok(index)
}

/// Downloads one file and uploads it to its destination path.
async fn transfer(
    source: &dyn SourceStore,
    destination: &dyn DestinationStore,
    task: &SyncTask,
) -> Result<(), SyncError> {
    let data = source.download(&task.source_file).await?;
    let size = data.len();
    destination.upload(&task.destination_path, data).await?;
    info!(
        file = %task.source_file.name,
        blob = %task.destination_path,
        size,
        "Uploaded"
    );
    Ok(())
}
