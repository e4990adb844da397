//! Configuration loading for skypiano.
//!
//! Every section falls back to compiled defaults, so a config file only has
//! to name the values it changes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use skyconf::SkyConfig;
//!
//! let config = SkyConfig::load().expect("Failed to load config");
//! println!("speed: {}", config.panel.clamped_speed());
//! println!("keymaps: {}", config.paths.keymap_dir().display());
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins, field by field):
//! 1. `/etc/skypiano/config.toml` (system)
//! 2. `~/.config/skypiano/config.toml` (user)
//! 3. `./skypiano.toml` (local override, or the `--config` path)
//! 4. Environment variables (`SKYPIANO_*`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! data_dir = "~/.local/share/skypiano"
//!
//! [panel]
//! long_press_mode = false
//! speed = 1.0
//! delay_next = 1.0
//!
//! [keyboard]
//! custom_keyboard = true
//! keys = ["q", "w", "e", "r", "t", "a", "s", "d", "f", "g", "z", "x", "c", "v", "b"]
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use settings::{
    clamp_speed, KeyboardConfig, PanelConfig, PathsConfig, TelemetryConfig, MAX_SPEED, MIN_SPEED,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write config file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Complete skypiano configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    pub paths: PathsConfig,
    pub panel: PanelConfig,
    pub keyboard: KeyboardConfig,
    pub telemetry: TelemetryConfig,
}

impl SkyConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with a specific file taking the place of the local
    /// `./skypiano.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let mut config = loader::config_from_table(merged, &origin)?;

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Load a single file on top of compiled defaults, without discovery or
    /// environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let table = loader::load_table(path)?;
        loader::config_from_table(table, path)
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();

        output.push_str("# skypiano configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!(
            "data_dir = {:?}\n",
            self.paths.data_dir.display().to_string()
        ));

        output.push_str("\n[panel]\n");
        output.push_str(&format!("long_press_mode = {}\n", self.panel.long_press_mode));
        output.push_str(&format!("speed = {:?}\n", self.panel.speed));
        output.push_str(&format!("delay_next = {:?}\n", self.panel.delay_next));

        output.push_str("\n[keyboard]\n");
        output.push_str(&format!("custom_keyboard = {}\n", self.keyboard.custom_keyboard));
        output.push_str("keys = [");
        let keys: Vec<String> = self.keyboard.keys.iter().map(|k| format!("{:?}", k)).collect();
        output.push_str(&keys.join(", "));
        output.push_str("]\n");

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = {:?}\n", self.telemetry.log_level));

        output
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, self.to_toml()).map_err(|e| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
