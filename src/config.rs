use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::file_store::FileStore;

/// Environment variables checked, in order, before `api_key`.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Days of cached puzzles to keep; 0 keeps every day.
    #[serde(default = "default_cache_retention_days")]
    pub cache_retention_days: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Empty means the platform data directory.
    #[serde(default)]
    pub data_dir: String,
}

fn default_theme() -> String {
    "ink-and-amber".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_cache_retention_days() -> u32 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            model: default_model(),
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_retention_days: default_cache_retention_days(),
            log_level: default_log_level(),
            data_dir: String::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eastern-mysteries")
    }

    /// Clamp values a hand-edited file could push out of range.
    pub fn normalize(&mut self) {
        if !self.temperature.is_finite() {
            self.temperature = default_temperature();
        }
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_with(|name| env::var(name).ok())
    }

    fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|&name| lookup(name))
            .chain(std::iter::once(self.api_key.clone()))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        if self.data_dir.trim().is_empty() {
            FileStore::default_dir()
        } else {
            PathBuf::from(&self.data_dir)
        }
    }
}
