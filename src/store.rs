//! Opaque string key-value persistence.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DONE_TWEETS_KEY: &str = "done-tweets";
pub const DONE_TRUTHS_KEY: &str = "done-truths";
pub const SELECTION_KEY: &str = "selection";
pub const CUSTOM_HASHTAGS_KEY: &str = "custom-hashtags";
pub const CUSTOM_MENTIONS_KEY: &str = "custom-mentions";
pub const CUSTOM_MESSAGES_KEY: &str = "custom-messages";
pub const HIDDEN_MESSAGES_KEY: &str = "hidden-messages";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store, nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file mapping keys to string values.
///
/// The whole file is rewritten on every change, through a temp file and a
/// rename so a crash mid-write never leaves a truncated file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store. A corrupt
    /// one is moved aside to `<name>.corrupt` and the store starts empty, so
    /// startup is never blocked and the damaged bytes are not overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    let backup = corrupt_path(&path);
                    match fs::rename(&path, &backup) {
                        Ok(()) => tracing::warn!(
                            path = %path.display(),
                            backup = %backup.display(),
                            error = %e,
                            "preference file is corrupt, moved aside"
                        ),
                        Err(rename_err) => tracing::error!(
                            path = %path.display(),
                            error = %e,
                            rename_error = %rename_err,
                            "preference file is corrupt and could not be moved aside"
                        ),
                    }
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read preference file");
                Map::new()
            }
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened preference store");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.entries)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), Value::String(value));
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
