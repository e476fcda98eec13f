//! Projection of a content item into an Algolia record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dc::ContentItem;

/// Record written to the search index, keyed by content item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl IndexDocument {
    /// Build a record from a content item body.
    ///
    /// With an empty `properties` set the whole body is copied; otherwise
    /// only top-level keys in the set are kept. A body key named `objectID`
    /// is always dropped so the content item id stays authoritative.
    pub fn project(item: &ContentItem, properties: &BTreeSet<String>) -> Self {
        let fields = item
            .body
            .iter()
            .filter(|(key, _)| key.as_str() != "objectID")
            .filter(|(key, _)| properties.is_empty() || properties.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            object_id: item.id.clone(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blog_post() -> ContentItem {
        serde_json::from_value(json!({
            "id": "item-1",
            "body": {
                "title": "Hello",
                "body": "World",
                "author": "Ann",
                "_meta": { "schema": "https://schema.example.com/blog.json" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_project_whitelisted_properties() {
        let properties = BTreeSet::from(["title".to_string(), "body".to_string()]);

        let doc = IndexDocument::project(&blog_post(), &properties);

        assert_eq!(doc.object_id, "item-1");
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields["title"], json!("Hello"));
        assert_eq!(doc.fields["body"], json!("World"));
        assert!(!doc.fields.contains_key("author"));
    }

    #[test]
    fn test_project_full_body_without_whitelist() {
        let doc = IndexDocument::project(&blog_post(), &BTreeSet::new());

        assert_eq!(doc.fields.len(), 4);
        assert!(doc.fields.contains_key("author"));
        assert!(doc.fields.contains_key("_meta"));
    }

    #[test]
    fn test_project_ignores_missing_whitelisted_properties() {
        let properties = BTreeSet::from(["title".to_string(), "summary".to_string()]);

        let doc = IndexDocument::project(&blog_post(), &properties);

        assert_eq!(doc.fields.len(), 1);
        assert!(doc.fields.contains_key("title"));
    }

    #[test]
    fn test_serialized_shape() {
        let properties = BTreeSet::from(["title".to_string()]);
        let doc = IndexDocument::project(&blog_post(), &properties);

        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value, json!({ "objectID": "item-1", "title": "Hello" }));
    }

    #[test]
    fn test_body_object_id_is_dropped() {
        let item: ContentItem = serde_json::from_value(json!({
            "id": "item-1",
            "body": { "objectID": "spoofed", "title": "Hello" }
        }))
        .unwrap();

        let doc = IndexDocument::project(&item, &BTreeSet::new());

        assert_eq!(doc.object_id, "item-1");
        assert!(!doc.fields.contains_key("objectID"));
    }
}
