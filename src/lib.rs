//! Compose and share categorized promotional posts from the terminal.
//!
//! Built-in templates come from a TOML [`catalog::Catalog`]; the user's
//! hashtag/mention selection, custom entries, hidden templates and posting
//! history live in a [`store::PreferenceStore`] and are re-validated by
//! [`normalize`] on every load.

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod share;
pub mod state;
pub mod store;
pub mod tokens;
pub mod ui;
