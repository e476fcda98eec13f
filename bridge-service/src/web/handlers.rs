//! Webhook endpoint handlers.
//!
//! The `/webhook` handler runs after signature verification and:
//! 1. Parses the `snapshot.published` event
//! 2. Reads the published content item from Dynamic Content
//! 3. Drops it if its content type is not whitelisted (still 200 OK)
//! 4. Projects the body into an index record and upserts it into Algolia
//!
//! Nothing is retried here. A 202 response tells Dynamic Content to deliver
//! the event again later.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::dc::{ContentSource, WebhookEvent};
use crate::error::AppError;
use crate::search::{IndexDocument, SearchIndex};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub content: Arc<dyn ContentSource>,
    pub index: Arc<dyn SearchIndex>,
}

impl AppState {
    pub fn new(
        config: Config,
        content: Arc<dyn ContentSource>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            content,
            index,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Snapshot Published Webhook
// =============================================================================

/// Webhook response.
///
/// `status` is `indexed` when the record was written and `ignored` when the
/// event was filtered out. Both are returned with 200 OK.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(rename = "objectID")]
    pub object_id: String,
}

impl WebhookResponse {
    fn indexed(object_id: String) -> Self {
        Self {
            status: "indexed",
            object_id,
        }
    }

    fn ignored(object_id: String) -> Self {
        Self {
            status: "ignored",
            object_id,
        }
    }
}

/// An empty whitelist allows every content type.
pub fn is_content_type_allowed(whitelist: &BTreeSet<String>, content_type: Option<&str>) -> bool {
    whitelist.is_empty() || content_type.is_some_and(|t| whitelist.contains(t))
}

/// `snapshot.published` webhook endpoint.
pub async fn snapshot_published_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let event = WebhookEvent::parse(&body)?;
    let content_item_id = event.content_item_id();

    info!(
        snapshot_id = %event.payload.id,
        content_item_id = %content_item_id,
        "webhook_received"
    );

    let item = state.content.fetch_content_item(content_item_id).await?;

    if !is_content_type_allowed(&state.config.content_type_whitelist, item.content_type()) {
        info!(
            content_item_id = %item.id,
            content_type = ?item.content_type(),
            "webhook_content_type_ignored"
        );
        return Ok(Json(WebhookResponse::ignored(item.id)));
    }

    let properties = &state.config.content_type_property_whitelist;
    let document = IndexDocument::project(&item, properties);

    if !properties.is_empty() && document.fields.is_empty() {
        info!(content_item_id = %item.id, "webhook_no_whitelisted_properties");
        return Ok(Json(WebhookResponse::ignored(item.id)));
    }

    state.index.upsert(&document).await?;

    info!(
        content_item_id = %item.id,
        field_count = document.fields.len(),
        "webhook_indexed"
    );

    Ok(Json(WebhookResponse::indexed(item.id)))
}
