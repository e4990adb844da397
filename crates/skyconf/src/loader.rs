//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, SkyConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/skypiano/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("skypiano/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("skypiano.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a config file as a raw TOML table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`; overlay values win, nested tables merge.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Build a config from a merged table. Keys absent from the table keep their
/// compiled defaults.
pub fn config_from_table(table: toml::Table, path: &Path) -> Result<SkyConfig, ConfigError> {
    let mut config: SkyConfig =
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    config.paths.data_dir = expand_path(&config.paths.data_dir.to_string_lossy());
    Ok(config)
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut SkyConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("SKYPIANO_DATA_DIR") {
        config.paths.data_dir = expand_path(&v);
        sources.env_overrides.push("SKYPIANO_DATA_DIR".to_string());
    }

    if let Ok(v) = env::var("SKYPIANO_SPEED") {
        if let Ok(speed) = v.parse() {
            config.panel.speed = speed;
            sources.env_overrides.push("SKYPIANO_SPEED".to_string());
        }
    }
    if let Ok(v) = env::var("SKYPIANO_LONG_PRESS") {
        config.panel.long_press_mode = parse_flag(&v);
        sources.env_overrides.push("SKYPIANO_LONG_PRESS".to_string());
    }
    if let Ok(v) = env::var("SKYPIANO_DELAY_NEXT") {
        if let Ok(secs) = v.parse() {
            config.panel.delay_next = secs;
            sources.env_overrides.push("SKYPIANO_DELAY_NEXT".to_string());
        }
    }

    if let Ok(v) = env::var("SKYPIANO_CUSTOM_KEYBOARD") {
        config.keyboard.custom_keyboard = parse_flag(&v);
        sources.env_overrides.push("SKYPIANO_CUSTOM_KEYBOARD".to_string());
    }

    if let Ok(v) = env::var("SKYPIANO_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("SKYPIANO_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
