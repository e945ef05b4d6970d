//! Logging bootstrap
//!
//! Two layers: a human-readable console layer at INFO (raised by `-v`),
//! and a size-rotated file layer at DEBUG under `LOG_DIR` (default: the
//! working directory). The file rolls at 5 MB and keeps five backups.
//! A log directory that cannot be written must not kill the run, so
//! file-layer setup failure degrades to console-only with a warning.

use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::rotate::SizeRotatingWriter;

/// Log file name inside `LOG_DIR`
const LOG_FILE_NAME: &str = "spbsync.log";

/// Size threshold at which the log file rolls
const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

/// Number of rotated backup files kept on disk
const MAX_LOG_BACKUPS: usize = 5;

/// Initializes the global subscriber and returns the file writer guard.
///
/// The caller must hold the guard until shutdown; dropping it flushes
/// the non-blocking file writer.
pub fn init(verbosity: u8) -> Option<WorkerGuard> {
    let console_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(console_filter);

    let log_dir = std::env::var("LOG_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| ".".to_string());

    match SizeRotatingWriter::new(&log_dir, LOG_FILE_NAME, MAX_LOG_BYTES, MAX_LOG_BACKUPS) {
        Ok(file_writer) => {
            let (writer, guard) = tracing_appender::non_blocking(file_writer);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug"));

            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(console_layer).init();
            warn!(
                log_dir = %log_dir,
                error = %e,
                "Cannot open log file, continuing with console logging only"
            );
            None
        }
    }
}
