use serde::{Deserialize, Serialize};

/// A post template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
}

impl Message {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A labelled set of mentions shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionGroup {
    pub label: String,
    pub mentions: Vec<String>,
}

impl MentionGroup {
    pub fn new(label: impl Into<String>, mentions: Vec<String>) -> Self {
        Self {
            label: label.into(),
            mentions,
        }
    }

    /// Labels compare case-insensitively.
    pub fn has_label(&self, label: &str) -> bool {
        self.label.to_lowercase() == label.to_lowercase()
    }
}

/// Where an entry of the effective message list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Shipped with the catalog. Removing one hides it.
    BuiltIn,
    /// Added by the user. Removing one deletes it.
    Custom,
}

/// The two share actions a message can be dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Tweet,
    Truth,
}

impl ShareTarget {
    pub fn label(self) -> &'static str {
        match self {
            ShareTarget::Tweet => "tweet",
            ShareTarget::Truth => "truth",
        }
    }
}

/// Key used in the done and hidden sets: `"{category}-{message_id}"`.
pub fn message_key(category: &str, message_id: &str) -> String {
    format!("{}-{}", category, message_id)
}
