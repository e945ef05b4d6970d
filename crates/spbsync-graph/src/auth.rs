//! OAuth2 client-credentials flow for Microsoft Graph
//!
//! Authenticates the sync job as a daemon application (no signed-in user)
//! against the Microsoft identity platform, using the tenant-scoped token
//! endpoint and the `.default` Graph scope. Token storage is deliberately
//! absent: a run is one-shot and a fresh token comfortably outlives it.

use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, ClientId, ClientSecret, EndpointNotSet, EndpointSet, Scope,
    TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use spbsync_core::domain::{StoreSide, SyncError};

/// Scope requesting all application permissions granted to the app registration
const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Access token received from the identity platform
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Bearer token for authenticating Graph requests
    pub access_token: String,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Returns true if the access token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Client-credentials token acquisition using the `oauth2` crate
#[derive(Debug)]
pub struct GraphAuth {
    client: BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    scope: String,
}

impl GraphAuth {
    /// Creates an authenticator for the given tenant and app credentials.
    pub fn new(
        tenant: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let token_url = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token");
        Self::with_token_url(client_id, client_secret, token_url)
    }

    /// Creates an authenticator with a custom token endpoint (useful for testing).
    pub fn with_token_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let client = BasicClient::new(ClientId::new(client_id.into()))
            .set_client_secret(ClientSecret::new(client_secret.into()))
            .set_token_uri(
                TokenUrl::new(token_url.into())
                    .map_err(|e| SyncError::Config(format!("invalid token endpoint URL: {e}")))?,
            );

        Ok(Self {
            client,
            scope: GRAPH_DEFAULT_SCOPE.to_string(),
        })
    }

    /// Exchanges the app credentials for an access token.
    ///
    /// A rejected exchange maps to [`SyncError::Auth`] for the source
    /// side, which aborts the run before any listing is attempted.
    pub async fn acquire_token(&self) -> Result<Tokens, SyncError> {
        debug!("Requesting client-credentials token");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_client_credentials()
            .add_scope(Scope::new(self.scope.clone()))
            .request_async(&http_client)
            .await
            .map_err(|e| SyncError::Auth {
                side: StoreSide::Source,
                message: format!("token exchange failed: {e}"),
            })?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        info!("Acquired Graph access token");
        Ok(Tokens {
            access_token: token_result.access_token().secret().to_string(),
            expires_at,
        })
    }
}
