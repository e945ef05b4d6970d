//! Azure storage credentials
//!
//! Resolves the destination credential from the run configuration into
//! either Shared Key (account key, used to sign each request) or a SAS
//! token (appended to each request URL). Invalid credentials are a
//! configuration error and abort the run before any transfer.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use spbsync_core::config::StorageIdentity;
use spbsync_core::domain::SyncError;

/// Azure authentication method
#[derive(Debug)]
pub enum AzureAuth {
    /// Shared Key authentication using the decoded storage account key
    SharedKey { key_bytes: Vec<u8> },
    /// SAS token authentication (appended as query parameters)
    SasToken { token: String },
}

impl AzureAuth {
    /// Decodes a base64 account key into Shared Key credentials.
    pub fn shared_key(key: &str) -> Result<Self, SyncError> {
        let key_bytes = BASE64_STANDARD
            .decode(key)
            .map_err(|e| SyncError::Config(format!("storage account key is not valid base64: {e}")))?;
        Ok(Self::SharedKey { key_bytes })
    }

    /// Wraps a SAS token, stripping a leading '?' if present.
    pub fn sas_token(token: &str) -> Self {
        let token = token.strip_prefix('?').unwrap_or(token);
        Self::SasToken {
            token: token.to_string(),
        }
    }
}

/// Account identity resolved from the configuration: name, credential,
/// and the blob service endpoint.
#[derive(Debug)]
pub struct ResolvedAccount {
    pub account: String,
    pub base_url: String,
    pub auth: AzureAuth,
}

impl ResolvedAccount {
    /// Resolves the configured storage identity into a usable credential.
    pub fn from_identity(storage: &StorageIdentity) -> Result<Self, SyncError> {
        match storage {
            StorageIdentity::AccountName {
                account,
                shared_key,
                sas_token,
            } => {
                let auth = match (shared_key, sas_token) {
                    (Some(key), _) => AzureAuth::shared_key(key)?,
                    (None, Some(sas)) => AzureAuth::sas_token(sas),
                    (None, None) => {
                        return Err(SyncError::Config(
                            "no destination credential found: set AZURE_STORAGE_KEY or \
                             AZURE_STORAGE_SAS_TOKEN"
                                .to_string(),
                        ))
                    }
                };
                Ok(Self {
                    account: account.clone(),
                    base_url: format!("https://{account}.blob.core.windows.net"),
                    auth,
                })
            }
            StorageIdentity::ConnectionString(conn) => Self::from_connection_string(conn),
        }
    }

    /// Parses a storage connection string for the account name, key, and
    /// an optional explicit blob endpoint.
    fn from_connection_string(conn: &str) -> Result<Self, SyncError> {
        let mut account = None;
        let mut key = None;
        let mut endpoint = None;
        let mut suffix = "core.windows.net";

        for part in conn.split(';') {
            if let Some(v) = part.strip_prefix("AccountName=") {
                account = Some(v.to_string());
            } else if let Some(v) = part.strip_prefix("AccountKey=") {
                key = Some(v.to_string());
            } else if let Some(v) = part.strip_prefix("BlobEndpoint=") {
                endpoint = Some(v.trim_end_matches('/').to_string());
            } else if let Some(v) = part.strip_prefix("EndpointSuffix=") {
                suffix = v;
            }
        }

        let account = account.ok_or_else(|| {
            SyncError::Config("connection string has no AccountName".to_string())
        })?;
        let key = key.ok_or_else(|| {
            SyncError::Config("connection string has no AccountKey".to_string())
        })?;

        let base_url =
            endpoint.unwrap_or_else(|| format!("https://{account}.blob.{suffix}"));

        Ok(Self {
            auth: AzureAuth::shared_key(&key)?,
            account,
            base_url,
        })
    }
}
