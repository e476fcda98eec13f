//! Algolia REST client.
//!
//! Only the two calls this service needs: reading index settings (startup
//! credential check) and saving a single object.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use super::{IndexDocument, SearchIndex};
use crate::credentials::CredentialCheck;
use crate::error::{AppError, CredentialError};
use crate::util::{build_client, endpoint};
use crate::Config;

const SERVICE: &str = "Algolia";

/// Algolia API key, application and target index.
#[derive(Clone)]
pub struct AlgoliaCredentials {
    pub api_key: String,
    pub application_id: String,
    pub index_name: String,
}

impl fmt::Debug for AlgoliaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgoliaCredentials")
            .field("api_key", &"<REDACTED>")
            .field("application_id", &self.application_id)
            .field("index_name", &self.index_name)
            .finish()
    }
}

/// Response to a save-object call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveObjectResponse {
    #[serde(rename = "taskID", default)]
    task_id: Option<u64>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Algolia client bound to one index.
#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    http: Client,
    credentials: AlgoliaCredentials,
    base_url: Url,
}

impl AlgoliaClient {
    pub fn new(
        credentials: AlgoliaCredentials,
        base_url: Url,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            credentials,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Self::new(
            AlgoliaCredentials {
                api_key: config.algolia_api_key.clone(),
                application_id: config.algolia_application_id.clone(),
                index_name: config.algolia_index_name.clone(),
            },
            config.algolia_api_url.clone(),
            config.request_timeout,
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Algolia-API-Key", &self.credentials.api_key)
            .header("X-Algolia-Application-Id", &self.credentials.application_id)
    }

    fn index_url(&self, extra: &[&str]) -> Url {
        let mut segments = vec!["1", "indexes", self.credentials.index_name.as_str()];
        segments.extend_from_slice(extra);
        endpoint(&self.base_url, &segments)
    }
}

#[async_trait]
impl CredentialCheck for AlgoliaClient {
    fn service(&self) -> &'static str {
        SERVICE
    }

    /// Read the index settings: proves the key works and the index exists.
    async fn validate_credentials(&self) -> Result<(), CredentialError> {
        let resp = self
            .authorized(self.http.get(self.index_url(&["settings"])))
            .send()
            .await
            .map_err(|source| CredentialError::Unreachable {
                service: SERVICE,
                source,
            })?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(CredentialError::MissingIndex {
                service: SERVICE,
                index: self.credentials.index_name.clone(),
            }),
            status => Err(CredentialError::Rejected {
                service: SERVICE,
                status,
            }),
        }
    }
}

#[async_trait]
impl SearchIndex for AlgoliaClient {
    async fn upsert(&self, document: &IndexDocument) -> Result<(), AppError> {
        let resp = self
            .authorized(self.http.put(self.index_url(&[document.object_id.as_str()])))
            .json(document)
            .send()
            .await
            .map_err(|e| {
                error!(object_id = %document.object_id, error = %e, "algolia_upsert_request_error");
                AppError::SearchIndex(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                object_id = %document.object_id,
                status_code = status.as_u16(),
                body = %body,
                "algolia_upsert_rejected"
            );
            return Err(AppError::SearchIndex(format!("{}: {}", status, body)));
        }

        // The write already succeeded; an odd acknowledgement body is only logged.
        let ack = resp.json::<SaveObjectResponse>().await.ok();
        info!(
            index = %self.credentials.index_name,
            object_id = %document.object_id,
            task_id = ?ack.as_ref().and_then(|a| a.task_id),
            updated_at = ?ack.as_ref().and_then(|a| a.updated_at.as_deref()),
            "algolia_object_saved"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AlgoliaClient {
        AlgoliaClient::new(
            AlgoliaCredentials {
                api_key: "search-key".to_string(),
                application_id: "APPID".to_string(),
                index_name: "content".to_string(),
            },
            Url::parse(&server.uri()).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn document() -> IndexDocument {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Hello"));
        IndexDocument {
            object_id: "item-1".to_string(),
            fields,
        }
    }

    #[tokio::test]
    async fn test_validate_credentials_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/indexes/content/settings"))
            .and(header("X-Algolia-API-Key", "search-key"))
            .and(header("X-Algolia-Application-Id", "APPID"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hitsPerPage": 20 })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).validate_credentials().await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_credentials_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/indexes/content/settings"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server).validate_credentials().await.unwrap_err();

        assert!(matches!(
            err,
            CredentialError::Rejected {
                status: StatusCode::FORBIDDEN,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_validate_credentials_missing_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/indexes/content/settings"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).validate_credentials().await.unwrap_err();

        assert!(matches!(err, CredentialError::MissingIndex { .. }));
    }

    #[tokio::test]
    async fn test_upsert_puts_document() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/1/indexes/content/item-1"))
            .and(header("X-Algolia-API-Key", "search-key"))
            .and(body_json(json!({ "objectID": "item-1", "title": "Hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "updatedAt": "2024-01-01T00:00:00.000Z",
                "taskID": 42,
                "objectID": "item-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).upsert(&document()).await.unwrap();
    }

    #[tokio::test]
    async fn test_upsert_failure_is_search_index_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/1/indexes/content/item-1"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server).upsert(&document()).await.unwrap_err();

        match err {
            AppError::SearchIndex(message) => assert!(message.contains("quota exceeded")),
            other => panic!("Expected SearchIndex error, got {:?}", other),
        }
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = AlgoliaCredentials {
            api_key: "super-secret".to_string(),
            application_id: "APPID".to_string(),
            index_name: "content".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }
}
