//! Configuration types for Recon.
//!
//! This module provides the [`Config`] struct which stores user preferences
//! and where editor state lives. Configuration is persisted as TOML
//! (typically at `~/.config/recon/config.toml` on Unix systems).
//!
//! # Key Configuration Fields
//!
//! - `data_dir`: Directory holding the persisted editor state
//! - `default_title`: Title given to documents created without one
//! - `storage_prefix`: Prefix for the `documents` and `tabs` storage keys
//!
//! # Example
//!
//! ```ignore
//! use recon_core::config::Config;
//!
//! // Load from default location (native only)
//! let config = Config::load()?;
//!
//! assert_eq!(config.documents_key(), "recon-editor-documents");
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReconError, Result};

/// Default title for new documents.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Default storage key prefix.
pub const DEFAULT_STORAGE_PREFIX: &str = "recon-editor-";

/// `Config` is a data structure that represents the parts of Recon that the user can configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory where documents and tabs are persisted
    pub data_dir: PathBuf,

    /// Title for documents created without one
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Prefix prepended to the `documents` and `tabs` storage keys
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_storage_prefix() -> String {
    DEFAULT_STORAGE_PREFIX.to_string()
}

impl Config {
    /// Create a new config with the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            default_title: default_title(),
            storage_prefix: default_storage_prefix(),
        }
    }

    /// Storage key for the document collection
    pub fn documents_key(&self) -> String {
        format!("{}documents", self.storage_prefix)
    }

    /// Storage key for the tab list
    pub fn tabs_key(&self) -> String {
        format!("{}tabs", self.storage_prefix)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReconError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load config from a path, returning a default (rooted at `data_dir`) if
    /// it is missing or unreadable.
    pub fn load_from_or_default(path: &Path, data_dir: PathBuf) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config ({})", e);
                Self::new(data_dir)
            }
        }
    }
}

// ============================================================================
// Native-only implementation (not available in WASM)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recon");

        Self::new(data_dir)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Config {
    /// Get the config file path (~/.config/recon/config.toml)
    /// Only available on native platforms
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recon").join("config.toml"))
    }

    /// Load config from default location, or return default if file doesn't exist
    /// Only available on native platforms
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        // Return default config if file doesn't exist
        Ok(Config::default())
    }

    /// Save config to default location
    /// Only available on native platforms
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(ReconError::NoConfigDir)?;
        self.save_to(&path)
    }
}
