//! Keymap store location.
//!
//! Default path: `~/.local/share/skypiano/data`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the keymap store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base path. Keymaps live under `{base_path}/keymaps/`.
    pub base_path: PathBuf,

    /// Read-only mode - prevents any writes.
    #[serde(default)]
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_base_path(default_store_path())
    }
}

fn default_store_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.data_local_dir().join("skypiano").join("data"))
        .unwrap_or_else(|| PathBuf::from(".skypiano/data"))
}

impl StoreConfig {
    pub fn with_base_path(path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: path.into(),
            read_only: false,
        }
    }

    /// A config for players that only read compiled keymaps.
    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: path.into(),
            read_only: true,
        }
    }

    pub fn keymaps_dir(&self) -> PathBuf {
        self.base_path.join("keymaps")
    }
}
