//! FileStore: compiled keymaps on the local filesystem.
//!
//! Layout:
//! ```text
//! {base_path}/
//! └── keymaps/
//!     ├── ab/
//!     │   └── cde123....json  # {"0":[...], ..., "<sentinel>":[]}
//!     └── 12/
//!         └── 3456789....json
//! ```
//!
//! Artifacts are write-once. Editing a sheet produces a new keymap under a
//! new id; nothing is rewritten in place.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sheet::KeySchedule;
use tracing::debug;

use crate::config::StoreConfig;
use crate::id::KeymapId;

/// Storage backend for compiled keymaps.
pub trait KeymapStore: Send + Sync {
    /// Persist a schedule, returning its id.
    ///
    /// Storing an identical schedule again returns the same id without
    /// writing.
    fn put(&self, schedule: &KeySchedule) -> Result<KeymapId>;

    /// Load a schedule by id. `Ok(None)` if it isn't stored.
    fn get(&self, id: &KeymapId) -> Result<Option<KeySchedule>>;

    fn exists(&self, id: &KeymapId) -> bool;

    /// Filesystem path of a stored keymap, if there is one.
    fn path(&self, id: &KeymapId) -> Option<PathBuf>;
}

/// Filesystem-based keymap store.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    /// Create a FileStore, creating the keymaps directory unless read-only.
    pub fn new(config: StoreConfig) -> Result<Self> {
        if !config.read_only {
            fs::create_dir_all(config.keymaps_dir())
                .context("failed to create keymaps directory")?;
        }
        Ok(Self { config })
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::with_base_path(path))
    }

    pub fn read_only_at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::read_only(path))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn keymap_path(&self, id: &KeymapId) -> PathBuf {
        self.config
            .keymaps_dir()
            .join(id.prefix())
            .join(format!("{}.json", id.remainder()))
    }
}

impl KeymapStore for FileStore {
    fn put(&self, schedule: &KeySchedule) -> Result<KeymapId> {
        if self.config.read_only {
            anyhow::bail!("keymap store is in read-only mode");
        }

        let json = schedule.to_json();
        let id = KeymapId::from_data(json.as_bytes());
        let path = self.keymap_path(&id);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create keymap prefix directory")?;
        }

        if path.exists() {
            debug!(id = %id, "keymap already stored");
        } else {
            fs::write(&path, json).context("failed to write keymap file")?;
            debug!(id = %id, entries = schedule.len(), "stored keymap");
        }

        Ok(id)
    }

    fn get(&self, id: &KeymapId) -> Result<Option<KeySchedule>> {
        let path = self.keymap_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("failed to read keymap file: {}", path.display()))?;
        let schedule = KeySchedule::from_json(&json)
            .with_context(|| format!("failed to parse keymap {}", id))?;
        Ok(Some(schedule))
    }

    fn exists(&self, id: &KeymapId) -> bool {
        self.keymap_path(id).exists()
    }

    fn path(&self, id: &KeymapId) -> Option<PathBuf> {
        let path = self.keymap_path(id);
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }
}
