//! Dynamic Content API client.
//!
//! Authenticates with the OAuth client-credentials grant and reads content
//! items. A token is requested for every call; nothing is cached between
//! webhook deliveries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::types::ContentItem;
use super::ContentSource;
use crate::credentials::CredentialCheck;
use crate::error::{AppError, CredentialError};
use crate::util::{build_client, endpoint};
use crate::Config;

const SERVICE: &str = "Dynamic Content";

/// OAuth client credentials.
#[derive(Clone)]
pub struct DcCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for DcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DcCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .finish()
    }
}

/// Auth and API base URLs.
#[derive(Debug, Clone)]
pub struct DcEndpoints {
    pub auth_url: Url,
    pub api_url: Url,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Failure of a single Dynamic Content round trip.
#[derive(Debug, Error)]
enum DcError {
    #[error("{step} returned {status}")]
    Status {
        step: &'static str,
        status: StatusCode,
    },

    #[error("{step} failed: {source}")]
    Transport {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl From<DcError> for CredentialError {
    fn from(err: DcError) -> Self {
        match err {
            DcError::Status { status, .. } => CredentialError::Rejected {
                service: SERVICE,
                status,
            },
            DcError::Transport { source, .. } if source.is_decode() => {
                CredentialError::InvalidResponse {
                    service: SERVICE,
                    message: source.to_string(),
                }
            }
            DcError::Transport { source, .. } => CredentialError::Unreachable {
                service: SERVICE,
                source,
            },
        }
    }
}

impl From<DcError> for AppError {
    fn from(err: DcError) -> Self {
        AppError::ContentRequest(err.to_string())
    }
}

/// Dynamic Content client.
#[derive(Debug, Clone)]
pub struct DcClient {
    http: Client,
    credentials: DcCredentials,
    endpoints: DcEndpoints,
}

impl DcClient {
    pub fn new(
        credentials: DcCredentials,
        endpoints: DcEndpoints,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            credentials,
            endpoints,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            DcCredentials {
                client_id: config.dc_client_id.clone(),
                client_secret: config.dc_client_secret.clone(),
            },
            DcEndpoints {
                auth_url: config.dc_auth_url.clone(),
                api_url: config.dc_api_url.clone(),
            },
            config.request_timeout,
        )
    }

    /// Exchange the client credentials for an access token.
    async fn access_token(&self) -> Result<String, DcError> {
        const STEP: &str = "authentication";

        let url = endpoint(&self.endpoints.auth_url, &["oauth", "token"]);
        let resp = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|source| DcError::Transport { step: STEP, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DcError::Status { step: STEP, status });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|source| DcError::Transport { step: STEP, source })?;

        debug!("dc_token_acquired");
        Ok(token.access_token)
    }

    /// Authenticated GET against the content API.
    async fn get(&self, step: &'static str, segments: &[&str]) -> Result<reqwest::Response, DcError> {
        let token = self.access_token().await?;
        let url = endpoint(&self.endpoints.api_url, segments);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| DcError::Transport { step, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DcError::Status { step, status });
        }

        Ok(resp)
    }
}

#[async_trait]
impl CredentialCheck for DcClient {
    fn service(&self) -> &'static str {
        SERVICE
    }

    /// Authenticate, then list hubs to prove the token is usable.
    async fn validate_credentials(&self) -> Result<(), CredentialError> {
        self.get("hub listing", &["hubs"]).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentSource for DcClient {
    async fn fetch_content_item(&self, id: &str) -> Result<ContentItem, AppError> {
        const STEP: &str = "content item request";

        let resp = self.get(STEP, &["content-items", id]).await?;
        let item: ContentItem = resp
            .json()
            .await
            .map_err(|source| DcError::Transport { step: STEP, source })?;

        info!(
            content_item_id = %item.id,
            label = ?item.label,
            version = ?item.version,
            content_type = ?item.content_type(),
            "dc_content_item_fetched"
        );

        Ok(item)
    }
}
