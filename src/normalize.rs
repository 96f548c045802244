//! Validation of persisted preference documents.
//!
//! Everything here is pure: it takes whatever JSON came out of the store and
//! returns the in-memory shape, dropping anything malformed instead of
//! failing.

use crate::model::{Message, MentionGroup};
use crate::tokens::{normalize_hashtag, normalize_mention};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// Label given to mentions migrated from the old flat-list format.
pub const DEFAULT_MENTION_GROUP: &str = "Mentions";

/// Shape of a persisted mention document.
#[derive(Debug)]
enum MentionDocument<'a> {
    /// Legacy format: a flat array of handles.
    Flat(Vec<&'a str>),
    /// Current format: an array of `{label, mentions}` objects.
    Grouped(&'a [Value]),
    Invalid,
}

impl<'a> MentionDocument<'a> {
    fn classify(value: &'a Value) -> Self {
        let Some(items) = value.as_array() else {
            return MentionDocument::Invalid;
        };
        let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
        match strings {
            Some(handles) => MentionDocument::Flat(handles),
            None => MentionDocument::Grouped(items),
        }
    }
}

/// Normalize a single mention candidate. Non-strings and blank strings yield
/// `None`.
pub fn normalize_mention_value(value: &Value) -> Option<String> {
    value.as_str().and_then(normalize_mention)
}

/// Turn a persisted mention document into validated groups.
///
/// Handles are trimmed, prefixed with `@` and deduplicated (exact match)
/// across every group in the document; the first occurrence wins. Groups
/// without a label or without surviving mentions are dropped.
pub fn normalize_mention_groups(value: &Value) -> Vec<MentionGroup> {
    let mut seen = HashSet::new();

    match MentionDocument::classify(value) {
        MentionDocument::Invalid => Vec::new(),
        MentionDocument::Flat(handles) => {
            let mentions: Vec<String> = handles
                .into_iter()
                .filter_map(normalize_mention)
                .filter(|m| seen.insert(m.clone()))
                .collect();
            if mentions.is_empty() {
                Vec::new()
            } else {
                vec![MentionGroup::new(DEFAULT_MENTION_GROUP, mentions)]
            }
        }
        MentionDocument::Grouped(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                let label = obj
                    .get("label")
                    .and_then(Value::as_str)
                    .map(|l| l.trim().to_string())
                    .unwrap_or_default();
                let mentions = obj
                    .get("mentions")
                    .and_then(Value::as_array)
                    .map(|raw| {
                        raw.iter()
                            .filter_map(normalize_mention_value)
                            .filter(|m| seen.insert(m.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                MentionGroup::new(label, mentions)
            })
            // Mentions of a dropped group still count as seen.
            .filter(|g| !g.label.is_empty() && !g.mentions.is_empty())
            .collect(),
    }
}

/// Normalize a persisted hashtag list: strings only, `#`-prefixed, no
/// duplicates.
pub fn normalize_hashtags(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(normalize_hashtag)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Normalize persisted custom messages against the current category list.
///
/// Unknown categories are dropped, as are entries without a non-empty string
/// `id` or without non-blank string `text`. Ids are deduplicated per
/// category, first occurrence wins. The result follows category list order
/// and omits categories left empty.
pub fn normalize_custom_messages(
    value: &Value,
    categories: &[String],
) -> IndexMap<String, Vec<Message>> {
    let mut result = IndexMap::new();
    let Some(obj) = value.as_object() else {
        return result;
    };

    for category in categories {
        let Some(items) = obj.get(category).and_then(Value::as_array) else {
            continue;
        };
        let mut ids = HashSet::new();
        let messages: Vec<Message> = items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| {
                let id = entry.get("id").and_then(Value::as_str)?;
                let text = entry.get("text").and_then(Value::as_str)?;
                if id.is_empty() || text.trim().is_empty() {
                    return None;
                }
                Some(Message::new(id, text))
            })
            .filter(|m| ids.insert(m.id.clone()))
            .collect();
        if !messages.is_empty() {
            result.insert(category.clone(), messages);
        }
    }

    result
}
