//! Cache configuration loaded from TOML.

use crate::paths::RetouchPaths;
use crate::storage::FileStorage;
use retouch_core::error::{Result, RetouchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_KEY_PREFIX: &str = "photo_editor_state_";
pub const DEFAULT_LAST_ACTIVE_KEY: &str = "photo_editor_last_image_id";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Typical per-origin local storage quota.
pub const DEFAULT_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

/// Settings for the session cache and its storage medium.
///
/// # Example
///
/// ```toml
/// key_prefix = "photo_editor_state_"
/// last_active_key = "photo_editor_last_image_id"
/// debounce_ms = 500
/// storage_dir = "/var/lib/retouch/cache"
/// capacity_bytes = 5242880
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Prefix shared by every per-subject snapshot key.
    pub key_prefix: String,
    /// Key of the last-active subject pointer.
    pub last_active_key: String,
    /// Quiet period before a draft-prompt write is flushed.
    pub debounce_ms: u64,
    /// Directory for file-backed storage. Defaults to `RetouchPaths::cache_dir()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    pub capacity_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            last_active_key: DEFAULT_LAST_ACTIVE_KEY.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            storage_dir: None,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl CacheConfig {
    /// Loads the config from `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `RetouchError::Config` if the file cannot be read, cannot be
    /// parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[CacheConfig] No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RetouchError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads the config from the platform default location.
    pub fn load_default() -> Result<Self> {
        Self::load(&RetouchPaths::config_file()?)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the cache store relies on.
    pub fn validate(&self) -> Result<()> {
        if self.key_prefix.is_empty() {
            return Err(RetouchError::config("key_prefix must not be empty"));
        }
        if self.last_active_key.is_empty() {
            return Err(RetouchError::config("last_active_key must not be empty"));
        }
        // clear_all() deletes by prefix and must never take the pointer with it.
        if self.last_active_key.starts_with(&self.key_prefix) {
            return Err(RetouchError::config(format!(
                "last_active_key '{}' must not start with key_prefix '{}'",
                self.last_active_key, self.key_prefix
            )));
        }
        if self.capacity_bytes == 0 {
            return Err(RetouchError::config("capacity_bytes must be greater than zero"));
        }
        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resolved_storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => RetouchPaths::cache_dir(),
        }
    }

    /// Opens the file-backed medium this config describes.
    pub fn open_file_storage(&self) -> Result<FileStorage> {
        FileStorage::open(self.resolved_storage_dir()?, self.capacity_bytes)
    }
}
