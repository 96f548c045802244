use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "amplifier";
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 280;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Where preferences and history are kept.
    pub data_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    /// TOML catalog to use instead of the built-in content.
    pub catalog_file: Option<PathBuf>,
    pub max_message_len: Option<usize>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Load from `path`, falling back to the default location. A missing
    /// file gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| data_dir().join("preferences.json"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("amplifier.log"))
    }

    pub fn max_message_len(&self) -> usize {
        self.max_message_len.unwrap_or(DEFAULT_MAX_MESSAGE_LEN)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
