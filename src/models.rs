//! Public data models exchanged with the links backend.

use crate::constants::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// Kind of saved content. The backend lists each kind separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A generic saved page.
    Link,
    Video,
    /// An embeddable code snippet.
    Embed,
}

impl ContentKind {
    /// Fetch and merge order used by the aggregation layer.
    pub const ALL: [ContentKind; 3] = [ContentKind::Link, ContentKind::Video, ContentKind::Embed];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Link => "link",
            ContentKind::Video => "video",
            ContentKind::Embed => "embed",
        }
    }
}

/// Membership of a content item in a universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// One saved piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "_id")]
    pub id: String,
    /// Creation time in epoch milliseconds, assigned by the backend.
    #[serde(rename = "_creationTime")]
    pub creation_time: f64,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub universes: Vec<UniverseRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A named, colored grouping of content items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Server-maintained member count. Advisory only.
    #[serde(default)]
    pub count: u64,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: Vec<T>,
    pub is_done: bool,
    #[serde(default)]
    pub continue_cursor: Option<String>,
}

/// Options shared by the per-kind listings and the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub universe_id: Option<String>,
    pub hide_archived: bool,
    pub hide_read: bool,
    pub page_size: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            universe_id: None,
            hide_archived: false,
            hide_read: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterOptions {
    /// Whether an item passes the hide flags.
    ///
    /// Universe scoping is left to the backend; listed items need not embed
    /// their universe relations.
    pub fn admits(&self, item: &ContentItem) -> bool {
        !((self.hide_archived && item.is_archived) || (self.hide_read && item.is_read))
    }
}

/// Free-text search plus an optional universe filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Empty means no text filter.
    pub text: String,
    pub universe_id: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        SearchQuery {
            text: text.into(),
            universe_id: None,
        }
    }

    pub fn in_universe(mut self, universe_id: impl Into<String>) -> Self {
        self.universe_id = Some(universe_id.into());
        self
    }
}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    /// Base64 image data captured by the host, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

impl SaveRequest {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        SaveRequest {
            url: url.into(),
            title: title.into(),
            selection: None,
            screenshot: None,
            collection_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub item_id: String,
}

/// Merged result of the per-kind listings.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub items: Vec<ContentItem>,
    /// False when a sub-fetch failed for authentication reasons. The host
    /// should show a login prompt rather than an empty list.
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_item() {
        let json = serde_json::json!({
            "_id": "k1",
            "_creationTime": 1712345678901.5,
            "url": "https://www.example.com/a",
            "title": "Example",
            "domain": "www.example.com",
            "type": "video",
            "isRead": true,
            "universes": [{ "_id": "u1", "name": "Reading" }],
            "tags": [{ "name": "rust" }]
        });
        let item: ContentItem = serde_json::from_value(json).expect("parse failed");
        assert_eq!(item.kind, ContentKind::Video);
        assert!(item.is_read);
        assert!(!item.is_archived);
        assert_eq!(item.summary, None);
        assert_eq!(item.universes[0].name, "Reading");
    }

    #[test]
    fn save_request_skips_absent_fields() {
        let mut req = SaveRequest::new("https://example.com", "Example");
        req.collection_id = Some("u1".into());
        let json = serde_json::to_value(&req).expect("serialize failed");
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://example.com",
                "title": "Example",
                "collectionId": "u1"
            })
        );
    }

    #[test]
    fn filter_admits_respects_flags() {
        let item: ContentItem = serde_json::from_value(serde_json::json!({
            "_id": "k1",
            "_creationTime": 1.0,
            "url": "https://example.com",
            "type": "link",
            "isArchived": true
        }))
        .expect("parse failed");

        assert!(FilterOptions::default().admits(&item));
        let hide = FilterOptions {
            hide_archived: true,
            ..FilterOptions::default()
        };
        assert!(!hide.admits(&item));
        let scoped = FilterOptions {
            universe_id: Some("u1".into()),
            ..FilterOptions::default()
        };
        assert!(scoped.admits(&item));
    }
}
