//! Error types for startup and request handling.
//!
//! Startup errors (`ConfigError`, `CredentialError`) are fatal and handled in
//! `main`. Request errors (`AppError`) carry their own HTTP status and are
//! turned into JSON responses by their `IntoResponse` impl.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Environment configuration failed validation.
#[derive(Debug, Error)]
#[error("Environment configuration error: {}", .messages.join("; "))]
pub struct ConfigError {
    pub messages: Vec<String>,
}

/// A startup credential round trip failed.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{service} rejected the supplied credentials ({status})")]
    Rejected {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} index \"{index}\" does not exist")]
    MissingIndex { service: &'static str, index: String },

    #[error("{service} is unreachable: {source}")]
    Unreachable {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned an unexpected response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },
}

/// Errors raised while handling a webhook request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing webhook signature header")]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Webhook payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The content system could not serve the item yet. Reported as 202 so
    /// the sender retries later instead of treating the event as invalid.
    #[error("Dynamic Content request failed: {0}")]
    ContentRequest(String),

    #[error("Search index request failed: {0}")]
    SearchIndex(String),

    #[error("Not found")]
    NotFound,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingSignature | AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ContentRequest(_) => StatusCode::ACCEPTED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::SearchIndex(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body written for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request_failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request_rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::MalformedPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ContentRequest("not ready".into()).status_code(),
            StatusCode::ACCEPTED
        );
        assert_eq!(
            AppError::SearchIndex("quota".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::PayloadTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = AppError::ContentRequest("snapshot pending".into()).into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = AppError::SearchIndex("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_error_display_lists_messages() {
        let err = ConfigError {
            messages: vec![
                "\"WEBHOOK_SECRET\" is required".to_string(),
                "\"DC_CLIENT_ID\" is required".to_string(),
            ],
        };

        let text = err.to_string();
        assert!(text.contains("WEBHOOK_SECRET"));
        assert!(text.contains("DC_CLIENT_ID"));
    }
}
