//! Web server module for handling Dynamic Content webhooks.
//!
//! This module provides:
//! - `POST /webhook`: signature-checked `snapshot.published` handler
//! - `GET /health`: liveness check for load balancers
//! - A fallback and panic handler so every failure becomes a JSON response

pub mod error_handler;
pub mod handlers;
pub mod signature;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use error_handler::{handle_panic, not_found};
pub use handlers::{
    health, is_content_type_allowed, snapshot_published_webhook, AppState, HealthResponse,
    WebhookResponse,
};
pub use signature::{verify_signature, verify_webhook_signature, MAX_BODY_BYTES, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/webhook",
            post(snapshot_published_webhook).route_layer(middleware::from_fn_with_state(
                state.clone(),
                verify_webhook_signature,
            )),
        )
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
