//! Dynamic Content webhook signature verification.
//!
//! Dynamic Content signs each webhook with HMAC-SHA256 over the raw request
//! body, base64-encoded in the `X-Amplience-Webhook-Signature` header. The
//! middleware buffers the exact bytes received, verifies them, and hands the
//! same bytes on to the route handler.

use axum::{
    body::{self, Body},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use http_body_util::LengthLimitError;
use sha2::Sha256;
use tracing::warn;

use super::AppState;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-amplience-webhook-signature";

/// Largest webhook body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// HMAC-SHA256 keyed with the webhook secret.
fn keyed_mac(secret: &str) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes()).ok()
}

/// Compute the base64 HMAC-SHA256 signature of `body`.
#[cfg(test)]
pub(crate) fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = keyed_mac(secret).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a webhook signature against the raw body.
///
/// The digest comparison is constant time (`Mac::verify_slice`).
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    if secret.is_empty() || signature.is_empty() {
        warn!(
            has_secret = !secret.is_empty(),
            has_signature = !signature.is_empty(),
            "webhook_signature_missing_fields"
        );
        return false;
    }

    let provided = match STANDARD.decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "webhook_signature_not_base64");
            return false;
        }
    };

    let Some(mut mac) = keyed_mac(secret) else {
        warn!("webhook_signature_invalid_key");
        return false;
    };
    mac.update(body);

    let valid = mac.verify_slice(&provided).is_ok();
    if !valid {
        warn!(
            body_length = body.len(),
            signature_length = provided.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
}

/// Middleware rejecting requests whose signature does not match the body.
pub async fn verify_webhook_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let signature = match parts.headers.get(SIGNATURE_HEADER) {
        None => {
            warn!("webhook_signature_header_missing");
            return Err(AppError::MissingSignature);
        }
        Some(value) => value.to_str().map_err(|_| AppError::InvalidSignature)?.to_owned(),
    };

    let bytes = body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(body_read_error)?;

    if !verify_signature(&state.config.webhook_secret, &bytes, &signature) {
        warn!(body_length = bytes.len(), "webhook_signature_invalid");
        return Err(AppError::InvalidSignature);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

/// Only an exceeded length limit is a 413. Anything else means the body
/// never arrived in full.
fn body_read_error(err: axum::Error) -> AppError {
    let err = err.into_inner();
    if err.is::<LengthLimitError>() {
        warn!(limit = MAX_BODY_BYTES, "webhook_body_too_large");
        AppError::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        }
    } else {
        warn!(error = %err, "webhook_body_read_failed");
        AppError::MalformedPayload(format!("Failed to read request body: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "webhook-secret";
    const BODY: &[u8] = br#"{"name":"dynamic-content.snapshot.published"}"#;

    #[test]
    fn test_verify_signature_valid() {
        let signature = compute_signature(SECRET, BODY);
        assert!(verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = compute_signature("other-secret", BODY);
        assert!(!verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_mutated_body() {
        let signature = compute_signature(SECRET, BODY);
        let mut mutated = BODY.to_vec();
        mutated[5] ^= 0x01;

        assert!(!verify_signature(SECRET, &mutated, &signature));
    }

    #[test]
    fn test_verify_signature_whitespace_in_body_matters() {
        // Re-serialised JSON differs from the bytes that were signed.
        let signature = compute_signature(SECRET, br#"{"a": 1}"#);
        assert!(!verify_signature(SECRET, br#"{"a":1}"#, &signature));
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        assert!(!verify_signature("", BODY, "sig"));
        assert!(!verify_signature(SECRET, BODY, ""));
    }

    #[test]
    fn test_verify_signature_not_base64() {
        assert!(!verify_signature(SECRET, BODY, "***not base64***"));
    }

    #[test]
    fn test_compute_signature_is_base64_sha256() {
        let signature = compute_signature(SECRET, BODY);
        let decoded = STANDARD.decode(&signature).unwrap();
        assert_eq!(decoded.len(), 32);
    }
}
