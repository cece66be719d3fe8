//! Client-side matching and relevance ranking of content items.

use crate::models::{ContentItem, SearchQuery};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Lower-cased search terms derived from an item.
pub fn keywords(item: &ContentItem) -> BTreeSet<String> {
    let mut words: BTreeSet<String> = item
        .title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let domain = item.domain.to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    if !domain.is_empty() {
        words.insert(domain.to_string());
    }

    words.extend(item.tags.iter().map(|t| t.name.to_lowercase()));
    words.extend(item.universes.iter().map(|u| u.name.to_lowercase()));
    words.insert(item.kind.as_str().to_string());
    words
}

/// Case-insensitive substring match over keywords, title, URL and summary.
pub fn matches(item: &ContentItem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    keywords(item).iter().any(|k| k.contains(&needle))
        || item.title.to_lowercase().contains(&needle)
        || item.url.to_lowercase().contains(&needle)
        || item
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&needle))
}

/// Newest first.
pub fn by_recency(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.creation_time.total_cmp(&a.creation_time)
}

/// Exact title, then title prefix, then title contains, then recency.
pub fn compare(a: &ContentItem, b: &ContentItem, query: &str) -> Ordering {
    if query.is_empty() {
        return by_recency(a, b);
    }
    let needle = query.to_lowercase();
    let a_title = a.title.to_lowercase();
    let b_title = b.title.to_lowercase();

    // `true` sorts first, hence the reversed operands.
    (b_title == needle)
        .cmp(&(a_title == needle))
        .then_with(|| b_title.starts_with(&needle).cmp(&a_title.starts_with(&needle)))
        .then_with(|| b_title.contains(&needle).cmp(&a_title.contains(&needle)))
        .then_with(|| by_recency(a, b))
}

/// Stable sort by [`compare`].
pub fn rank(mut items: Vec<ContentItem>, query: &str) -> Vec<ContentItem> {
    items.sort_by(|a, b| compare(a, b, query));
    items
}

/// Universe filter, text match, then ranking.
pub fn search(items: Vec<ContentItem>, query: &SearchQuery) -> Vec<ContentItem> {
    let text = query.text.trim();
    let hits = items
        .into_iter()
        .filter(|item| match &query.universe_id {
            Some(id) => item.universes.iter().any(|u| &u.id == id),
            None => true,
        })
        .filter(|item| matches(item, text))
        .collect();
    rank(hits, text)
}
