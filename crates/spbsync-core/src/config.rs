//! Run configuration
//!
//! All settings come from the process environment, are validated once at
//! startup, and live in an immutable [`Config`] passed by reference to
//! every component. No component reads environment variables directly
//! after this point.

use crate::domain::SyncError;
use crate::rules::RuleSet;

/// Default number of concurrent transfer workers
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// How the destination storage account is identified and authenticated
#[derive(Debug, Clone)]
pub enum StorageIdentity {
    /// Account name plus a separate credential
    /// (`AZURE_STORAGE_KEY` or `AZURE_STORAGE_SAS_TOKEN`)
    AccountName {
        account: String,
        shared_key: Option<String>,
        sas_token: Option<String>,
    },
    /// Full connection string carrying account name and key
    ConnectionString(String),
}

/// Immutable configuration for one run
#[derive(Debug)]
pub struct Config {
    /// Entra tenant used for the source token endpoint
    pub tenant: String,
    /// Application (client) ID for source-store auth
    pub client_id: String,
    /// Application secret for source-store auth
    pub client_secret: String,
    /// SharePoint site URL, e.g. `https://contoso.sharepoint.com/sites/Finance`
    pub site_url: String,
    /// Source folder to enumerate (non-recursive)
    pub folder_path: String,
    /// Destination container name
    pub container: String,
    /// Destination account identity and credentials
    pub storage: StorageIdentity,
    /// Compiled filename routing rules
    pub rules: RuleSet,
    /// Transfer worker pool size
    pub worker_count: usize,
    /// Optional cap on matched files handled per run
    pub max_files: Option<usize>,
}

impl Config {
    /// Reads and validates the configuration from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_vars(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Reads and validates the configuration through a variable lookup.
    ///
    /// Missing required variables are collected and reported together in
    /// a single [`SyncError::Config`], so an operator sees the whole
    /// problem at once instead of one variable per run.
    pub fn from_vars<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| -> String {
            match lookup(name) {
                Some(value) => value,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let tenant = require("TENANT");
        let client_id = require("SOURCE_CLIENT_ID");
        let client_secret = require("SOURCE_CLIENT_SECRET");
        let site_url = require("SITE_URL");
        let folder_path = require("FOLDER_PATH");
        let container = require("BLOB_CONTAINER_NAME");
        let patterns_json = require("FILENAME_PATTERNS");

        let account_name = lookup("STORAGE_ACCOUNT_NAME");
        let connection_string = lookup("STORAGE_CONNECTION_STRING");
        if account_name.is_none() && connection_string.is_none() {
            missing.push("STORAGE_ACCOUNT_NAME or STORAGE_CONNECTION_STRING");
        }

        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let storage = match (account_name, connection_string) {
            (Some(account), _) => StorageIdentity::AccountName {
                account,
                shared_key: lookup("AZURE_STORAGE_KEY"),
                sas_token: lookup("AZURE_STORAGE_SAS_TOKEN"),
            },
            (None, Some(conn)) => StorageIdentity::ConnectionString(conn),
            (None, None) => unreachable!("guarded by the missing-variable check"),
        };

        let rules = RuleSet::parse(&patterns_json)?;

        let worker_count = match lookup("WORKER_COUNT") {
            None => DEFAULT_WORKER_COUNT,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    SyncError::Config(format!(
                        "WORKER_COUNT must be a positive integer, got '{raw}'"
                    ))
                })?,
        };

        let max_files = match lookup("MAX_FILES") {
            None => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                SyncError::Config(format!("MAX_FILES must be a non-negative integer, got '{raw}'"))
            })?),
        };

        Ok(Self {
            tenant,
            client_id,
            client_secret,
            site_url,
            folder_path,
            container,
            storage,
            rules,
            worker_count,
            max_files,
        })
    }
}
