//! Application state: what the user selected, added, hid and already posted.
//!
//! Every mutation is written through to the [`PreferenceStore`] right away.
//! Writes are fire-and-forget: a failed write is logged and the in-memory
//! state stays authoritative for the rest of the session.

use crate::catalog::{compose_message, Catalog, Entry, Progress};
use crate::error::ValidationError;
use crate::model::{message_key, Message, MentionGroup, Origin, ShareTarget};
use crate::normalize::{normalize_custom_messages, normalize_hashtags, normalize_mention_groups};
use crate::share::share_url;
use crate::store::{
    PreferenceStore, CUSTOM_HASHTAGS_KEY, CUSTOM_MENTIONS_KEY, CUSTOM_MESSAGES_KEY,
    DONE_TRUTHS_KEY, DONE_TWEETS_KEY, HIDDEN_MESSAGES_KEY, SELECTION_KEY,
};
use crate::tokens::{normalize_hashtag, normalize_mention, TokenSet};
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Label of the group holding the catalog's own mentions in merged views.
pub const BUILTIN_MENTION_GROUP: &str = "Suggested";

/// A hashtag or mention offered for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    pub token: String,
    pub origin: Origin,
}

/// A group of mentions in the merged (built-in + custom) view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionView {
    pub label: String,
    pub items: Vec<TagItem>,
}

pub struct AppState<S: PreferenceStore> {
    store: S,
    catalog: Catalog,
    max_message_len: usize,
    done_tweets: TokenSet,
    done_truths: TokenSet,
    selection: TokenSet,
    custom_hashtags: Vec<String>,
    custom_mentions: Vec<MentionGroup>,
    custom_messages: IndexMap<String, Vec<Message>>,
    hidden: TokenSet,
}

impl<S: PreferenceStore> AppState<S> {
    /// Load every persisted document independently. A malformed document is
    /// logged and replaced by its empty default without affecting the others.
    ///
    /// Custom messages that reuse a built-in id in their category are dropped,
    /// and selected tokens that are no longer offered are deselected.
    pub fn load(catalog: Catalog, store: S, max_message_len: usize) -> Self {
        let token_set = |key: &str| {
            read_json(&store, key)
                .map(|v| TokenSet::from_json(&v))
                .unwrap_or_default()
        };
        let done_tweets = token_set(DONE_TWEETS_KEY);
        let done_truths = token_set(DONE_TRUTHS_KEY);
        let selection = token_set(SELECTION_KEY);
        let hidden = token_set(HIDDEN_MESSAGES_KEY);
        let custom_hashtags = read_json(&store, CUSTOM_HASHTAGS_KEY)
            .map(|v| normalize_hashtags(&v))
            .unwrap_or_default();
        let custom_mentions = read_json(&store, CUSTOM_MENTIONS_KEY)
            .map(|v| normalize_mention_groups(&v))
            .unwrap_or_default();
        let mut custom_messages = read_json(&store, CUSTOM_MESSAGES_KEY)
            .map(|v| normalize_custom_messages(&v, catalog.categories()))
            .unwrap_or_default();
        for (category, messages) in custom_messages.iter_mut() {
            messages.retain(|m| {
                let shadows = catalog.message(category, &m.id).is_some();
                if shadows {
                    warn!(category = %category, id = %m.id, "dropping custom message that reuses a built-in id");
                }
                !shadows
            });
        }
        custom_messages.retain(|_, messages| !messages.is_empty());

        info!(
            done_tweets = done_tweets.len(),
            done_truths = done_truths.len(),
            selected = selection.len(),
            custom_hashtags = custom_hashtags.len(),
            custom_mention_groups = custom_mentions.len(),
            hidden = hidden.len(),
            "loaded preferences"
        );

        let mut state = Self {
            store,
            catalog,
            max_message_len,
            done_tweets,
            done_truths,
            selection,
            custom_hashtags,
            custom_mentions,
            custom_messages,
            hidden,
        };
        state.drop_unoffered_selection();
        state
    }

    fn drop_unoffered_selection(&mut self) {
        let stale: Vec<String> = self
            .selection
            .iter()
            .filter(|token| !self.is_offered(token))
            .map(str::to_string)
            .collect();
        if stale.is_empty() {
            return;
        }
        for token in &stale {
            self.selection.remove(token);
        }
        warn!(dropped = ?stale, "deselected tokens that are no longer offered");
        persist(&mut self.store, SELECTION_KEY, &self.selection);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn max_message_len(&self) -> usize {
        self.max_message_len
    }

    pub fn selection(&self) -> &TokenSet {
        &self.selection
    }

    pub fn custom_hashtags(&self) -> &[String] {
        &self.custom_hashtags
    }

    pub fn custom_mentions(&self) -> &[MentionGroup] {
        &self.custom_mentions
    }

    pub fn custom_messages(&self, category: &str) -> &[Message] {
        self.custom_messages
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn hidden(&self) -> &TokenSet {
        &self.hidden
    }

    fn done_set(&self, target: ShareTarget) -> &TokenSet {
        match target {
            ShareTarget::Tweet => &self.done_tweets,
            ShareTarget::Truth => &self.done_truths,
        }
    }

    pub fn is_done(&self, target: ShareTarget, category: &str, id: &str) -> bool {
        self.done_set(target).contains(&message_key(category, id))
    }

    // ---- catalog views ----

    pub fn entries<'a>(&'a self, category: &'a str) -> Vec<Entry<'a>> {
        self.catalog
            .effective_messages(category, &self.hidden, &self.custom_messages)
    }

    pub fn progress(&self, category: &str) -> Progress {
        Progress::of(&self.entries(category), &self.done_tweets)
    }

    fn entry<'a>(&'a self, category: &'a str, id: &str) -> Result<Entry<'a>, ValidationError> {
        if !self.catalog.has_category(category) {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }
        self.entries(category)
            .into_iter()
            .find(|e| e.message.id == id)
            .ok_or_else(|| ValidationError::UnknownMessage {
                category: category.to_string(),
                id: id.to_string(),
            })
    }

    /// Outgoing text for a message with the current selection appended.
    pub fn compose(&self, category: &str, id: &str) -> Result<String, ValidationError> {
        let entry = self.entry(category, id)?;
        Ok(compose_message(&entry.message.text, &self.selection))
    }

    /// Built-in hashtags followed by custom ones.
    pub fn hashtag_items(&self) -> Vec<TagItem> {
        let builtin = self.catalog.hashtags().iter().map(|t| TagItem {
            token: t.clone(),
            origin: Origin::BuiltIn,
        });
        let custom = self.custom_hashtags.iter().map(|t| TagItem {
            token: t.clone(),
            origin: Origin::Custom,
        });
        builtin.chain(custom).collect()
    }

    /// Built-in mentions as the first group, then the custom groups. A token
    /// appears once, in the first group that has it.
    pub fn mention_views(&self) -> Vec<MentionView> {
        let mut seen = HashSet::new();
        let mut views = Vec::new();

        let builtin: Vec<TagItem> = self
            .catalog
            .mentions()
            .iter()
            .filter(|m| seen.insert(m.as_str()))
            .map(|m| TagItem {
                token: m.clone(),
                origin: Origin::BuiltIn,
            })
            .collect();
        if !builtin.is_empty() {
            views.push(MentionView {
                label: BUILTIN_MENTION_GROUP.to_string(),
                items: builtin,
            });
        }

        for group in &self.custom_mentions {
            let items: Vec<TagItem> = group
                .mentions
                .iter()
                .filter(|m| seen.insert(m.as_str()))
                .map(|m| TagItem {
                    token: m.clone(),
                    origin: Origin::Custom,
                })
                .collect();
            if !items.is_empty() {
                views.push(MentionView {
                    label: group.label.clone(),
                    items,
                });
            }
        }
        views
    }

    /// Whether `token` is one of the hashtags or mentions offered for
    /// selection.
    pub fn is_offered(&self, token: &str) -> bool {
        self.catalog.hashtags().iter().any(|t| t == token)
            || self.custom_hashtags.iter().any(|t| t == token)
            || self.mention_exists(token)
    }

    fn mention_exists(&self, mention: &str) -> bool {
        self.catalog.mentions().iter().any(|m| m == mention)
            || self
                .custom_mentions
                .iter()
                .any(|g| g.mentions.iter().any(|m| m == mention))
    }

    // ---- selection ----

    /// Flip `token` in the selection. Returns whether it is selected now.
    pub fn toggle(&mut self, token: &str) -> bool {
        let selected = self.selection.toggle(token);
        persist(&mut self.store, SELECTION_KEY, &self.selection);
        debug!(token, selected, "toggled selection");
        selected
    }

    /// Like [`toggle`](Self::toggle), but only tokens that are offered can
    /// be selected. Deselecting is always allowed.
    pub fn select(&mut self, token: &str) -> Result<bool, ValidationError> {
        if !self.selection.contains(token) && !self.is_offered(token) {
            return Err(ValidationError::UnknownToken(token.to_string()));
        }
        Ok(self.toggle(token))
    }

    fn deselect(&mut self, token: &str) {
        self.selection.remove(token);
        persist(&mut self.store, SELECTION_KEY, &self.selection);
    }

    pub fn add_custom_hashtag(&mut self, raw: &str) -> Result<String, ValidationError> {
        let tag = normalize_hashtag(raw).ok_or(ValidationError::EmptyHashtag)?;
        if self.catalog.hashtags().contains(&tag) || self.custom_hashtags.contains(&tag) {
            return Err(ValidationError::DuplicateHashtag(tag));
        }
        self.custom_hashtags.push(tag.clone());
        persist(&mut self.store, CUSTOM_HASHTAGS_KEY, &self.custom_hashtags);
        info!(tag = %tag, "added custom hashtag");
        Ok(tag)
    }

    /// Remove a custom hashtag and drop it from the selection. `raw` is
    /// normalized the same way as on add. Built-in hashtags are left alone.
    pub fn remove_custom_hashtag(&mut self, raw: &str) -> bool {
        let Some(tag) = normalize_hashtag(raw) else {
            return false;
        };
        let before = self.custom_hashtags.len();
        self.custom_hashtags.retain(|t| *t != tag);
        if self.custom_hashtags.len() == before {
            return false;
        }
        persist(&mut self.store, CUSTOM_HASHTAGS_KEY, &self.custom_hashtags);
        self.deselect(&tag);
        info!(tag = %tag, "removed custom hashtag");
        true
    }

    /// Add a mention to the group matching `label` (case-insensitive), or to
    /// a new group named `label`.
    pub fn add_custom_mention(&mut self, raw: &str, label: &str) -> Result<String, ValidationError> {
        let mention = normalize_mention(raw).ok_or(ValidationError::EmptyMention)?;
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyGroupLabel);
        }
        if self.mention_exists(&mention) {
            return Err(ValidationError::DuplicateMention(mention));
        }

        match self.custom_mentions.iter_mut().find(|g| g.has_label(label)) {
            Some(group) => group.mentions.push(mention.clone()),
            None => self
                .custom_mentions
                .push(MentionGroup::new(label, vec![mention.clone()])),
        }
        persist(&mut self.store, CUSTOM_MENTIONS_KEY, &self.custom_mentions);
        info!(mention = %mention, group = label, "added custom mention");
        Ok(mention)
    }

    /// Remove a custom mention, dropping its group if that empties it, and
    /// drop it from the selection unless it is also a built-in mention.
    pub fn remove_custom_mention(&mut self, raw: &str) -> bool {
        let Some(mention) = normalize_mention(raw) else {
            return false;
        };
        let mut removed = false;
        for group in &mut self.custom_mentions {
            let before = group.mentions.len();
            group.mentions.retain(|m| *m != mention);
            removed |= group.mentions.len() != before;
        }
        if !removed {
            return false;
        }
        self.custom_mentions.retain(|g| !g.mentions.is_empty());
        persist(&mut self.store, CUSTOM_MENTIONS_KEY, &self.custom_mentions);
        if !self.mention_exists(&mention) {
            self.deselect(&mention);
        }
        info!(mention = %mention, "removed custom mention");
        true
    }

    // ---- done tracking ----

    /// Record that a message was dispatched with `target`.
    pub fn mark_done(
        &mut self,
        target: ShareTarget,
        category: &str,
        id: &str,
    ) -> Result<(), ValidationError> {
        let key = self.entry(category, id)?.key();
        let (set, store_key) = match target {
            ShareTarget::Tweet => (&mut self.done_tweets, DONE_TWEETS_KEY),
            ShareTarget::Truth => (&mut self.done_truths, DONE_TRUTHS_KEY),
        };
        set.insert(key);
        persist(&mut self.store, store_key, &*set);
        Ok(())
    }

    /// Compose the outgoing text, build the share URL and mark the message
    /// done for `target`. Returns the URL for the caller to open.
    pub fn dispatch(
        &mut self,
        target: ShareTarget,
        category: &str,
        id: &str,
    ) -> Result<String, ValidationError> {
        let text = self.compose(category, id)?;
        let url = share_url(target, &text);
        self.mark_done(target, category, id)?;
        info!(action = target.label(), category, id, "dispatched message");
        Ok(url)
    }

    fn forget_done(&mut self, key: &str) {
        if self.done_tweets.remove(key) {
            persist(&mut self.store, DONE_TWEETS_KEY, &self.done_tweets);
        }
        if self.done_truths.remove(key) {
            persist(&mut self.store, DONE_TRUTHS_KEY, &self.done_truths);
        }
    }

    // ---- custom messages and hiding ----

    pub fn add_custom_message(&mut self, category: &str, text: &str) -> Result<String, ValidationError> {
        if !self.catalog.has_category(category) {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let len = text.chars().count();
        if len > self.max_message_len {
            return Err(ValidationError::TextTooLong {
                len,
                max: self.max_message_len,
            });
        }

        let base = format!("custom-{}", Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while self.catalog.message(category, &id).is_some()
            || self.custom_messages(category).iter().any(|m| m.id == id)
        {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.custom_messages
            .entry(category.to_string())
            .or_default()
            .push(Message::new(id.clone(), text));
        persist(&mut self.store, CUSTOM_MESSAGES_KEY, &self.custom_messages);
        info!(category, id = %id, "added custom message");
        Ok(id)
    }

    pub fn remove_custom_message(&mut self, category: &str, id: &str) -> Result<(), ValidationError> {
        let messages = self
            .custom_messages
            .get_mut(category)
            .filter(|msgs| msgs.iter().any(|m| m.id == id))
            .ok_or_else(|| ValidationError::UnknownMessage {
                category: category.to_string(),
                id: id.to_string(),
            })?;
        messages.retain(|m| m.id != id);
        if messages.is_empty() {
            self.custom_messages.shift_remove(category);
        }
        persist(&mut self.store, CUSTOM_MESSAGES_KEY, &self.custom_messages);
        self.forget_done(&message_key(category, id));
        Ok(())
    }

    /// Hide a built-in message and forget that it was ever posted.
    pub fn hide(&mut self, category: &str, id: &str) -> Result<(), ValidationError> {
        if self.catalog.message(category, id).is_none() {
            return Err(ValidationError::UnknownMessage {
                category: category.to_string(),
                id: id.to_string(),
            });
        }
        let key = message_key(category, id);
        self.hidden.insert(key.clone());
        persist(&mut self.store, HIDDEN_MESSAGES_KEY, &self.hidden);
        self.forget_done(&key);
        Ok(())
    }

    /// Show a hidden built-in message again. Returns false if it was not
    /// hidden.
    pub fn unhide(&mut self, category: &str, id: &str) -> bool {
        let removed = self.hidden.remove(&message_key(category, id));
        if removed {
            persist(&mut self.store, HIDDEN_MESSAGES_KEY, &self.hidden);
        }
        removed
    }

    /// Hide a built-in message or delete a custom one.
    pub fn remove_message(&mut self, category: &str, id: &str) -> Result<Origin, ValidationError> {
        let origin = self.entry(category, id)?.origin;
        match origin {
            Origin::BuiltIn => self.hide(category, id)?,
            Origin::Custom => self.remove_custom_message(category, id)?,
        }
        Ok(origin)
    }

    // ---- bulk resets ----

    pub fn clear_history(&mut self) {
        self.done_tweets.clear();
        self.done_truths.clear();
        forget(&mut self.store, DONE_TWEETS_KEY);
        forget(&mut self.store, DONE_TRUTHS_KEY);
        info!("cleared history");
    }

    pub fn clear_preferences(&mut self) {
        self.selection.clear();
        self.custom_hashtags.clear();
        self.custom_mentions.clear();
        forget(&mut self.store, SELECTION_KEY);
        forget(&mut self.store, CUSTOM_HASHTAGS_KEY);
        forget(&mut self.store, CUSTOM_MENTIONS_KEY);
        info!("cleared preferences");
    }
}

fn read_json<S: PreferenceStore>(store: &S, key: &str) -> Option<Value> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed preference");
            None
        }
    }
}

fn persist<S: PreferenceStore, T: Serialize + ?Sized>(store: &mut S, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(anyhow::Error::from)
        .and_then(|json| store.set(key, json));
    if let Err(e) = result {
        warn!(key, error = %e, "failed to persist preference");
    }
}

fn forget<S: PreferenceStore>(store: &mut S, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!(key, error = %e, "failed to remove preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DEFAULT_MENTION_GROUP;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r##"
categories = ["A", "B"]
hashtags = ["#one", "#two"]
mentions = ["@base"]

[[messages.A]]
id = "1"
text = "alpha"

[[messages.A]]
id = "2"
text = "beta"

[[messages.B]]
id = "1"
text = "gamma"
"##;

    fn catalog() -> Catalog {
        Catalog::from_toml(CATALOG).unwrap()
    }

    fn state_with(store: MemoryStore) -> AppState<MemoryStore> {
        AppState::load(catalog(), store, 50)
    }

    fn state() -> AppState<MemoryStore> {
        state_with(MemoryStore::new())
    }

    fn reload(state: AppState<MemoryStore>) -> AppState<MemoryStore> {
        state_with(state.store.clone())
    }

    #[test]
    fn test_load_empty_store() {
        let state = state();
        assert!(state.selection().is_empty());
        assert!(state.custom_hashtags().is_empty());
        assert!(state.custom_mentions().is_empty());
        assert_eq!(state.progress("A"), Progress { done: 0, total: 2 });
    }

    #[test]
    fn test_load_isolates_corrupt_keys() {
        let store = MemoryStore::new()
            .with_entry(DONE_TWEETS_KEY, "{broken")
            .with_entry(SELECTION_KEY, r##"["#one","@base"]"##)
            .with_entry(CUSTOM_HASHTAGS_KEY, "not json")
            .with_entry(CUSTOM_MENTIONS_KEY, r##"["pal"]"##)
            .with_entry(HIDDEN_MESSAGES_KEY, r##"["A-1"]"##);
        let state = state_with(store);

        assert_eq!(state.progress("A"), Progress { done: 0, total: 1 });
        assert_eq!(state.selection().join(" "), "#one @base");
        assert!(state.custom_hashtags().is_empty());
        assert_eq!(
            state.custom_mentions(),
            [MentionGroup::new(DEFAULT_MENTION_GROUP, vec!["@pal".into()])]
        );
    }

    #[test]
    fn test_load_drops_stale_custom_categories() {
        let store = MemoryStore::new().with_entry(
            CUSTOM_MESSAGES_KEY,
            r##"{"A":[{"id":"c1","text":"mine"}],"Gone":[{"id":"c2","text":"old"}]}"##,
        );
        let state = state_with(store);
        assert_eq!(state.custom_messages("A"), [Message::new("c1", "mine")]);
        assert!(state.custom_messages("Gone").is_empty());
        assert_eq!(state.progress("A").total, 3);
    }

    #[test]
    fn test_load_drops_custom_messages_shadowing_builtin_ids() {
        let store = MemoryStore::new().with_entry(
            CUSTOM_MESSAGES_KEY,
            r##"{"A":[{"id":"1","text":"mine"},{"id":"c1","text":"kept"}],"B":[{"id":"1","text":"clash"}]}"##,
        );
        let mut state = state_with(store);
        assert_eq!(state.custom_messages("A"), [Message::new("c1", "kept")]);
        assert!(state.custom_messages("B").is_empty());

        let entries = state.entries("A");
        let texts: Vec<_> = entries.iter().map(|e| e.message.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "kept"]);

        state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();
        assert_eq!(state.progress("A"), Progress { done: 1, total: 3 });
        assert_eq!(state.compose("A", "1"), Ok("alpha".to_string()));
    }

    #[test]
    fn test_add_custom_message_never_reuses_builtin_id() {
        let mut state = state();
        for _ in 0..3 {
            let id = state.add_custom_message("A", "mine").unwrap();
            assert!(state.catalog().message("A", &id).is_none());
        }
        assert_eq!(state.entries("A").len(), 5);
    }

    #[test]
    fn test_load_drops_selection_tokens_not_offered() {
        let store = MemoryStore::new()
            .with_entry(SELECTION_KEY, r##"["#ghost","@gone","#one","#mine"]"##)
            .with_entry(CUSTOM_HASHTAGS_KEY, r##"["#mine"]"##);
        let state = state_with(store);

        assert_eq!(state.selection().join(" "), "#one #mine");
        assert_eq!(state.compose("A", "1"), Ok("alpha\n\n#one #mine".to_string()));
        assert_eq!(
            state.store().get(SELECTION_KEY),
            Some(r##"["#one","#mine"]"##.to_string())
        );
    }

    #[test]
    fn test_select_rejects_tokens_not_offered() {
        let mut state = state();
        assert_eq!(
            state.select("nohash"),
            Err(ValidationError::UnknownToken("nohash".into()))
        );
        assert_eq!(state.select("#one"), Ok(true));
        assert_eq!(state.select("@base"), Ok(true));
        assert_eq!(state.select("#one"), Ok(false));
        assert_eq!(state.selection().join(" "), "@base");
    }

    #[test]
    fn test_selection_round_trip() {
        let mut state = state();
        state.toggle("@base");
        state.toggle("#two");
        state.toggle("#one");
        state.toggle("#two");
        let joined = state.selection().join(" ");
        assert_eq!(joined, "@base #one");

        let state = reload(state);
        assert_eq!(state.selection().join(" "), joined);
    }

    #[test]
    fn test_add_custom_hashtag_dedup() {
        let mut state = state();
        assert_eq!(state.add_custom_hashtag("foo"), Ok("#foo".to_string()));
        assert_eq!(
            state.add_custom_hashtag("#foo"),
            Err(ValidationError::DuplicateHashtag("#foo".to_string()))
        );
        assert_eq!(
            state.add_custom_hashtag("one"),
            Err(ValidationError::DuplicateHashtag("#one".to_string()))
        );
        assert_eq!(state.add_custom_hashtag("  "), Err(ValidationError::EmptyHashtag));
        assert_eq!(reload(state).custom_hashtags(), ["#foo"]);
    }

    #[test]
    fn test_remove_custom_hashtag_evicts_selection() {
        let mut state = state();
        state.add_custom_hashtag("foo").unwrap();
        state.toggle("#foo");
        state.toggle("#one");

        assert!(state.remove_custom_hashtag("#foo"));
        assert_eq!(state.selection().join(" "), "#one");

        let state = reload(state);
        assert!(state.custom_hashtags().is_empty());
        assert_eq!(state.selection().join(" "), "#one");
    }

    #[test]
    fn test_remove_custom_hashtag_normalizes_input() {
        let mut state = state();
        state.add_custom_hashtag("foo").unwrap();
        state.toggle("#foo");
        assert!(state.remove_custom_hashtag(" foo "));
        assert!(state.custom_hashtags().is_empty());
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_remove_builtin_hashtag_keeps_selection() {
        let mut state = state();
        state.toggle("#one");
        assert!(!state.remove_custom_hashtag("#one"));
        assert!(!state.remove_custom_hashtag("   "));
        assert_eq!(state.selection().join(" "), "#one");
        assert_eq!(reload(state).selection().join(" "), "#one");
    }

    #[test]
    fn test_remove_builtin_mention_keeps_selection() {
        let mut state = state();
        state.add_custom_mention("alice", "Press").unwrap();
        state.toggle("@base");
        state.toggle("@alice");
        assert!(!state.remove_custom_mention("base"));
        assert!(state.remove_custom_mention("alice"));
        assert_eq!(state.selection().join(" "), "@base");
    }

    #[test]
    fn test_add_custom_mention_groups() {
        let mut state = state();
        assert_eq!(state.add_custom_mention("alice", "Press"), Ok("@alice".into()));
        assert_eq!(state.add_custom_mention("@bob", " press "), Ok("@bob".into()));
        assert_eq!(state.add_custom_mention("carol", "Friends"), Ok("@carol".into()));

        assert_eq!(
            state.custom_mentions(),
            [
                MentionGroup::new("Press", vec!["@alice".into(), "@bob".into()]),
                MentionGroup::new("Friends", vec!["@carol".into()]),
            ]
        );
    }

    #[test]
    fn test_add_custom_mention_rejections() {
        let mut state = state();
        state.add_custom_mention("alice", "Press").unwrap();

        assert_eq!(state.add_custom_mention("", "Press"), Err(ValidationError::EmptyMention));
        assert_eq!(state.add_custom_mention("x", "  "), Err(ValidationError::EmptyGroupLabel));
        assert_eq!(
            state.add_custom_mention("base", "Other"),
            Err(ValidationError::DuplicateMention("@base".into()))
        );
        assert_eq!(
            state.add_custom_mention("@alice", "Other"),
            Err(ValidationError::DuplicateMention("@alice".into()))
        );
        // tokens are case-sensitive even though labels are not
        assert_eq!(state.add_custom_mention("Alice", "press"), Ok("@Alice".into()));
        assert_eq!(state.custom_mentions().len(), 1);
    }

    #[test]
    fn test_remove_custom_mention_evicts_selection_and_empty_group() {
        let mut state = state();
        state.add_custom_mention("x", "Solo").unwrap();
        state.add_custom_mention("y", "Pair").unwrap();
        state.add_custom_mention("z", "Pair").unwrap();
        state.toggle("@x");

        assert!(state.remove_custom_mention("@x"));
        assert!(state.selection().is_empty());
        assert_eq!(state.custom_mentions().len(), 1);

        assert!(state.remove_custom_mention("@y"));
        assert_eq!(
            reload(state).custom_mentions(),
            [MentionGroup::new("Pair", vec!["@z".into()])]
        );
    }

    #[test]
    fn test_mention_views_merge() {
        let store = MemoryStore::new().with_entry(
            CUSTOM_MENTIONS_KEY,
            r##"[{"label":"G","mentions":["@base","@new"]},{"label":"H","mentions":["@base"]}]"##,
        );
        let views = state_with(store).mention_views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].label, BUILTIN_MENTION_GROUP);
        assert_eq!(views[1].label, "G");
        assert_eq!(
            views[1].items,
            vec![TagItem {
                token: "@new".into(),
                origin: Origin::Custom
            }]
        );
    }

    #[test]
    fn test_hashtag_items_order() {
        let mut state = state();
        state.add_custom_hashtag("three").unwrap();
        let tokens: Vec<_> = state.hashtag_items().into_iter().map(|i| i.token).collect();
        assert_eq!(tokens, vec!["#one", "#two", "#three"]);
    }

    #[test]
    fn test_dispatch_marks_done_and_appends_selection() {
        let mut state = state();
        state.toggle("#one");
        state.toggle("@base");

        assert_eq!(state.compose("A", "1"), Ok("alpha\n\n#one @base".to_string()));
        let url = state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=alpha%0A%0A%23one%20%40base"
        );
        assert!(state.is_done(ShareTarget::Tweet, "A", "1"));
        assert!(!state.is_done(ShareTarget::Truth, "A", "1"));
        assert_eq!(state.progress("A"), Progress { done: 1, total: 2 });

        state.dispatch(ShareTarget::Truth, "A", "2").unwrap();
        // truth does not count toward progress
        assert_eq!(state.progress("A"), Progress { done: 1, total: 2 });

        let state = reload(state);
        assert!(state.is_done(ShareTarget::Tweet, "A", "1"));
        assert!(state.is_done(ShareTarget::Truth, "A", "2"));
    }

    #[test]
    fn test_dispatch_unknown_message() {
        let mut state = state();
        assert_eq!(
            state.dispatch(ShareTarget::Tweet, "Z", "1"),
            Err(ValidationError::UnknownCategory("Z".into()))
        );
        assert_eq!(
            state.dispatch(ShareTarget::Tweet, "A", "9"),
            Err(ValidationError::UnknownMessage {
                category: "A".into(),
                id: "9".into()
            })
        );
        assert!(state.store().get(DONE_TWEETS_KEY).is_none());
    }

    #[test]
    fn test_hide_clears_done_and_keeps_catalog() {
        let mut state = state();
        state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();
        state.dispatch(ShareTarget::Truth, "A", "1").unwrap();

        state.hide("A", "1").unwrap();
        assert!(!state.is_done(ShareTarget::Tweet, "A", "1"));
        assert!(!state.is_done(ShareTarget::Truth, "A", "1"));
        let ids: Vec<_> = state.entries("A").iter().map(|e| e.message.id.clone()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(state.catalog().message("A", "1").unwrap().text, "alpha");
        assert_eq!(state.progress("A"), Progress { done: 0, total: 1 });

        let mut state = reload(state);
        assert_eq!(state.entries("A").len(), 1);
        assert!(state.unhide("A", "1"));
        assert!(!state.unhide("A", "1"));
        assert_eq!(state.compose("A", "1"), Ok("alpha".to_string()));
        assert!(!state.is_done(ShareTarget::Tweet, "A", "1"));
    }

    #[test]
    fn test_hide_rejects_custom_and_unknown() {
        let mut state = state();
        let id = state.add_custom_message("A", "mine").unwrap();
        assert!(state.hide("A", &id).is_err());
        assert!(state.hide("A", "77").is_err());
        assert!(state.hidden().is_empty());
    }

    #[test]
    fn test_custom_message_lifecycle() {
        let mut state = state();
        let id = state.add_custom_message("B", "  my own take  ").unwrap();
        assert!(id.starts_with("custom-"));
        let second = state.add_custom_message("B", "another").unwrap();
        assert_ne!(id, second);

        let entries = state.entries("B");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].message.text, "my own take");
        assert_eq!(entries[1].origin, Origin::Custom);

        state.dispatch(ShareTarget::Tweet, "B", &id).unwrap();
        state.dispatch(ShareTarget::Truth, "B", &id).unwrap();
        assert_eq!(state.progress("B").done, 1);

        state.remove_custom_message("B", &id).unwrap();
        assert!(!state.is_done(ShareTarget::Tweet, "B", &id));
        assert!(!state.is_done(ShareTarget::Truth, "B", &id));

        let mut state = reload(state);
        assert_eq!(state.custom_messages("B").len(), 1);
        state.remove_custom_message("B", &second).unwrap();
        assert_eq!(state.store().get(CUSTOM_MESSAGES_KEY), Some("{}".to_string()));
    }

    #[test]
    fn test_add_custom_message_validation() {
        let mut state = state();
        assert_eq!(
            state.add_custom_message("Nope", "text"),
            Err(ValidationError::UnknownCategory("Nope".into()))
        );
        assert_eq!(state.add_custom_message("A", "   "), Err(ValidationError::EmptyText));
        assert_eq!(
            state.add_custom_message("A", &"x".repeat(51)),
            Err(ValidationError::TextTooLong { len: 51, max: 50 })
        );
        assert!(state.add_custom_message("A", &"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_remove_message_by_origin() {
        let mut state = state();
        let id = state.add_custom_message("A", "mine").unwrap();
        assert_eq!(state.remove_message("A", "2"), Ok(Origin::BuiltIn));
        assert_eq!(state.remove_message("A", &id), Ok(Origin::Custom));
        assert!(state.hidden().contains("A-2"));
        assert!(state.custom_messages("A").is_empty());
    }

    #[test]
    fn test_clear_history_removes_keys() {
        let mut state = state();
        state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();
        state.dispatch(ShareTarget::Truth, "B", "1").unwrap();
        state.toggle("#one");

        state.clear_history();
        assert_eq!(state.progress("A").done, 0);
        assert!(state.store().get(DONE_TWEETS_KEY).is_none());
        assert!(state.store().get(DONE_TRUTHS_KEY).is_none());
        assert_eq!(state.selection().join(" "), "#one");
    }

    #[test]
    fn test_clear_preferences_removes_keys() {
        let mut state = state();
        state.add_custom_hashtag("foo").unwrap();
        state.add_custom_mention("bar", "G").unwrap();
        state.toggle("#foo");
        state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();

        state.clear_preferences();
        assert!(state.selection().is_empty());
        assert!(state.custom_hashtags().is_empty());
        assert!(state.custom_mentions().is_empty());
        for key in [SELECTION_KEY, CUSTOM_HASHTAGS_KEY, CUSTOM_MENTIONS_KEY] {
            assert!(state.store().get(key).is_none());
        }
        assert!(state.is_done(ShareTarget::Tweet, "A", "1"));
    }

    #[test]
    fn test_done_never_exceeds_total() {
        let mut state = state();
        let id = state.add_custom_message("A", "mine").unwrap();
        let check = |state: &AppState<MemoryStore>| {
            for category in ["A", "B"] {
                let p = state.progress(category);
                assert!(p.done <= p.total, "{category}: {p:?}");
            }
        };
        check(&state);
        state.dispatch(ShareTarget::Tweet, "A", "1").unwrap();
        state.dispatch(ShareTarget::Tweet, "A", &id).unwrap();
        check(&state);
        state.hide("A", "1").unwrap();
        check(&state);
        state.remove_custom_message("A", &id).unwrap();
        check(&state);
        state.dispatch(ShareTarget::Tweet, "A", "2").unwrap();
        state.clear_history();
        check(&state);
    }
}
