//! Algolia search index integration.
//!
//! ```text
//! ContentItem → IndexDocument::project() → SearchIndex::upsert()
//! ```

pub mod algolia;
pub mod document;

use async_trait::async_trait;

use crate::error::AppError;

pub use algolia::{AlgoliaClient, AlgoliaCredentials};
pub use document::IndexDocument;

/// Write side of the search index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the record keyed by `document.object_id`.
    async fn upsert(&self, document: &IndexDocument) -> Result<(), AppError>;
}
