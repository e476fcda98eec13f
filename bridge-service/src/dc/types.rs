//! Dynamic Content message types.
//!
//! This module defines:
//! - The inbound `snapshot.published` webhook event
//! - The content item returned by the content API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Webhook event name handled by the `/webhook` route.
pub const SNAPSHOT_PUBLISHED: &str = "dynamic-content.snapshot.published";

// =============================================================================
// Webhook Event
// =============================================================================

/// Inbound webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event name, e.g. `dynamic-content.snapshot.published`
    pub name: String,
    pub payload: SnapshotPayload,
}

/// Published snapshot details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    /// Snapshot identifier
    pub id: String,
    /// The content item the snapshot was taken from
    pub root_content_item: ContentItemRef,
}

/// Reference to a content item inside an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItemRef {
    pub id: String,
}

impl WebhookEvent {
    /// Parse and check a raw webhook body.
    ///
    /// Anything that is not a `snapshot.published` event with a root content
    /// item id is a malformed payload.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedPayload(e.to_string()))?;

        if event.name != SNAPSHOT_PUBLISHED {
            return Err(AppError::MalformedPayload(format!(
                "unsupported event \"{}\"",
                event.name
            )));
        }

        if event.payload.root_content_item.id.trim().is_empty() {
            return Err(AppError::MalformedPayload(
                "payload.rootContentItem.id is empty".to_string(),
            ));
        }

        Ok(event)
    }

    pub fn content_item_id(&self) -> &str {
        &self.payload.root_content_item.id
    }
}

// =============================================================================
// Content Item
// =============================================================================

/// Content item as returned by the content API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
    /// Authored content. `_meta.schema` holds the content type URI.
    #[serde(default)]
    pub body: Map<String, Value>,
}

impl ContentItem {
    /// Content type schema URI from `body._meta.schema`.
    pub fn content_type(&self) -> Option<&str> {
        self.body.get("_meta")?.get("schema")?.as_str()
    }
}
