//! Dynamic Content integration.
//!
//! This module provides:
//! - Webhook event and content item types
//! - The API client used for credential validation and content reads

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::AppError;

pub use client::{DcClient, DcCredentials, DcEndpoints};
pub use types::{ContentItem, ContentItemRef, SnapshotPayload, WebhookEvent, SNAPSHOT_PUBLISHED};

/// Source of published content items.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a content item by id.
    ///
    /// Failures are reported as `AppError::ContentRequest`: the item may not
    /// be readable yet and the webhook sender should retry.
    async fn fetch_content_item(&self, id: &str) -> Result<ContentItem, AppError>;
}
