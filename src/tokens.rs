use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HASHTAG_PREFIX: char = '#';
pub const MENTION_PREFIX: char = '@';

/// Insertion-ordered set of strings.
///
/// Used for the hashtag/mention selection and for the done/hidden key sets.
/// Iteration order is insertion order, which is also the order the set is
/// persisted in and the order selected tokens are appended to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSet(IndexSet<String>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a persisted JSON value. Anything that is not an array
    /// yields an empty set, non-string members are skipped.
    pub fn from_json(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            return Self::default();
        };
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// Returns true if the token was not already present.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.0.insert(token.into())
    }

    /// Removes while keeping the relative order of the remaining members.
    pub fn remove(&mut self, token: &str) -> bool {
        self.0.shift_remove(token)
    }

    /// Flip membership. Returns whether the token is present afterwards.
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.remove(token) {
            false
        } else {
            self.0.insert(token.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Members joined by `sep` in insertion order.
    pub fn join(&self, sep: &str) -> String {
        self.iter().collect::<Vec<_>>().join(sep)
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for TokenSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Trim `raw` and make sure it starts with `prefix`. Returns `None` when
/// nothing is left after trimming.
pub fn normalize_token(raw: &str, prefix: char) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(prefix) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{prefix}{trimmed}"))
    }
}

pub fn normalize_hashtag(raw: &str) -> Option<String> {
    normalize_token(raw, HASHTAG_PREFIX)
}

pub fn normalize_mention(raw: &str) -> Option<String> {
    normalize_token(raw, MENTION_PREFIX)
}
