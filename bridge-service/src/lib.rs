//! Dynamic Content → Algolia bridge.
//!
//! Receives Dynamic Content `snapshot.published` webhooks and re-publishes
//! the published content item into an Algolia index.
//!
//! ## Architecture
//!
//! ```text
//! Dynamic Content → POST /webhook → signature check → content item read → Algolia upsert
//! ```

pub mod config;
pub mod credentials;
pub mod dc;
pub mod error;
pub mod search;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{validate_all, CredentialCheck};
pub use dc::{ContentItem, ContentSource, DcClient, WebhookEvent};
pub use error::{AppError, ConfigError, CredentialError};
pub use search::{AlgoliaClient, IndexDocument, SearchIndex};
pub use web::{router, AppState};
