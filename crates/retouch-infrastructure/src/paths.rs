//! Unified path management for Retouch files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/retouch/           # Config directory
//! └── config.toml              # Cache configuration
//!
//! ~/.local/share/retouch/      # Data directory
//! └── cache/                   # Session cache entries (FileStorage)
//! ```

use retouch_core::error::{Result, RetouchError};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "retouch";

/// Platform-aware path resolution for Retouch.
pub struct RetouchPaths;

impl RetouchPaths {
    /// Returns the Retouch configuration directory (e.g., `~/.config/retouch/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| RetouchError::config("Cannot find config directory"))
    }

    /// Returns the Retouch data directory (e.g., `~/.local/share/retouch/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| RetouchError::config("Cannot find data directory"))
    }

    /// Returns the path to the configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory backing the session cache.
    pub fn cache_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("cache"))
    }
}
