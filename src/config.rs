use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::Store;

const CONFIG_KEY: &str = "search_config";

/// Tunables for the share picker search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before the remote search goes out.
    pub debounce_ms: u64,
    /// Most recent dialogs scanned by the store-backed local index.
    pub dialog_scan_limit: usize,
    /// Upper bound on remote results, requested and accepted.
    pub remote_limit: usize,
    /// Non-pinned entries kept in the recent list.
    pub recent_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            dialog_scan_limit: 400,
            remote_limit: 20,
            recent_capacity: 20,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms > 5_000 {
            return Err(ConfigError::Invalid("debounce_ms out of range".into()));
        }
        if self.dialog_scan_limit == 0 || self.dialog_scan_limit > 10_000 {
            return Err(ConfigError::Invalid("dialog_scan_limit out of range".into()));
        }
        if self.remote_limit == 0 || self.remote_limit > 100 {
            return Err(ConfigError::Invalid("remote_limit out of range".into()));
        }
        if self.recent_capacity == 0 || self.recent_capacity > 200 {
            return Err(ConfigError::Invalid("recent_capacity out of range".into()));
        }
        Ok(())
    }

    /// Read the saved config, falling back to defaults when none is stored.
    pub fn load(store: &Store) -> Result<Self, ConfigError> {
        let config = match store.get_meta(CONFIG_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, store: &Store) -> Result<(), ConfigError> {
        self.validate()?;
        let json = serde_json::to_string(self)?;
        store.set_meta(CONFIG_KEY, &json)?;
        Ok(())
    }

    pub fn reset(store: &Store) -> Result<(), ConfigError> {
        store.delete_meta(CONFIG_KEY)?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(String),
    Parse(serde_json::Error),
    Store(sqlite::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::Store(e) => write!(f, "config store error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<sqlite::Error> for ConfigError {
    fn from(e: sqlite::Error) -> Self {
        ConfigError::Store(e)
    }
}
