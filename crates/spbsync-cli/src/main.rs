//! spbsync - one-shot SharePoint to Azure Blob Storage synchronizer
//!
//! Reads its configuration from the environment, lists a single
//! SharePoint folder, routes matching files to destination folders by
//! filename pattern, and uploads whatever is new or changed. Runs once
//! and exits; scheduling belongs to cron or a timer unit.
//!
//! Exit codes:
//! - 0: run completed (individual file failures are counted, not fatal)
//! - 1: run aborted (auth, listing, or connectivity failure)
//! - 2: invalid configuration

use clap::Parser;
use tracing::error;

use spbsync_core::config::Config;

mod logging;
mod rotate;
mod run;

#[derive(Debug, Parser)]
#[command(name = "spbsync", version, about = "Sync SharePoint folder contents to Azure Blob Storage")]
struct Cli {
    /// Verbose console output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The guard must outlive all logging and be dropped before exit so
    // the non-blocking file writer flushes.
    let guard = logging::init(cli.verbose);

    let code = execute().await;

    drop(guard);
    std::process::exit(code);
}

async fn execute() -> i32 {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return e.exit_code();
        }
    };

    match run::run(&config).await {
        Ok(_summary) => 0,
        Err(e) => {
            error!("Run aborted: {e}");
            e.exit_code()
        }
    }
}
