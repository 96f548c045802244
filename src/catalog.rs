use crate::model::{message_key, Message, Origin};
use crate::tokens::{normalize_hashtag, normalize_mention, TokenSet};
use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../content/catalog.toml");

/// Static, categorized post templates plus the built-in hashtags and
/// mentions offered for appending.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    categories: Vec<String>,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default)]
    mentions: Vec<String>,
    #[serde(default)]
    messages: IndexMap<String, Vec<Message>>,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG).context("built-in catalog is invalid")
    }

    /// Load the catalog from `path`, or the built-in one when no path is set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read catalog {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse catalog {}", path.display()))
            }
            None => Self::builtin(),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut catalog: Catalog = toml::from_str(contents)?;
        if catalog.categories.is_empty() {
            bail!("catalog defines no categories");
        }
        for category in catalog.messages.keys() {
            if !catalog.categories.contains(category) {
                bail!("messages listed under undeclared category {category:?}");
            }
        }
        for (category, messages) in &catalog.messages {
            let mut ids = HashSet::new();
            for message in messages {
                if !ids.insert(message.id.as_str()) {
                    bail!("duplicate message id {:?} in {category:?}", message.id);
                }
            }
        }

        let mut seen = HashSet::new();
        catalog.hashtags = catalog
            .hashtags
            .iter()
            .filter_map(|t| normalize_hashtag(t))
            .filter(|t| seen.insert(t.clone()))
            .collect();
        catalog.mentions = catalog
            .mentions
            .iter()
            .filter_map(|m| normalize_mention(m))
            .filter(|m| seen.insert(m.clone()))
            .collect();
        Ok(catalog)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn default_category(&self) -> &str {
        &self.categories[0]
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    pub fn messages(&self, category: &str) -> &[Message] {
        self.messages
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn message(&self, category: &str, id: &str) -> Option<&Message> {
        self.messages(category).iter().find(|m| m.id == id)
    }

    /// Effective list for `category`: visible built-in messages in catalog
    /// order, then the custom ones in insertion order.
    pub fn effective_messages<'a>(
        &'a self,
        category: &'a str,
        hidden: &TokenSet,
        custom: &'a IndexMap<String, Vec<Message>>,
    ) -> Vec<Entry<'a>> {
        let builtin = self
            .messages(category)
            .iter()
            .filter(|m| !hidden.contains(&message_key(category, &m.id)))
            .map(|message| Entry {
                category,
                message,
                origin: Origin::BuiltIn,
            });
        let added = custom
            .get(category)
            .into_iter()
            .flatten()
            .map(|message| Entry {
                category,
                message,
                origin: Origin::Custom,
            });
        builtin.chain(added).collect()
    }
}

/// One row of the effective message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub category: &'a str,
    pub message: &'a Message,
    pub origin: Origin,
}

impl Entry<'_> {
    pub fn key(&self) -> String {
        message_key(self.category, &self.message.id)
    }
}

/// Done/total for a category. Derived on every read, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(entries: &[Entry<'_>], done: &TokenSet) -> Self {
        Self {
            done: entries.iter().filter(|e| done.contains(&e.key())).count(),
            total: entries.len(),
        }
    }
}

/// Final post text: the template, followed by a blank line and the selected
/// tokens when any are selected.
pub fn compose_message(text: &str, selection: &TokenSet) -> String {
    if selection.is_empty() {
        text.to_string()
    } else {
        format!("{}\n\n{}", text, selection.join(" "))
    }
}
