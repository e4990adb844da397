//! Configuration sections consumed by the player.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Slowest playback multiplier accepted by the player.
pub const MIN_SPEED: f64 = 0.1;

/// Fastest playback multiplier accepted by the player.
pub const MAX_SPEED: f64 = 5.0;

/// Filesystem locations for imported sheets and compiled keymaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for application data.
    /// Default: ~/.local/share/skypiano
    pub data_dir: PathBuf,
}

impl PathsConfig {
    fn default_data_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".local/share/skypiano"))
            .unwrap_or_else(|| PathBuf::from(".local/share/skypiano"))
    }

    /// Directory holding compiled keymap artifacts.
    pub fn keymap_dir(&self) -> PathBuf {
        self.data_dir.join("data")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }
}

/// Transport panel settings: how a schedule is replayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    /// Hold each key until just before the next action instead of tapping it.
    pub long_press_mode: bool,

    /// Playback speed multiplier, clamped to `MIN_SPEED..=MAX_SPEED`.
    pub speed: f64,

    /// Seconds of silence held after the last note of a piece.
    pub delay_next: f64,
}

impl PanelConfig {
    /// Speed with out-of-range and non-finite values pulled back into range.
    pub fn clamped_speed(&self) -> f64 {
        clamp_speed(self.speed)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            long_press_mode: false,
            speed: 1.0,
            delay_next: 1.0,
        }
    }
}

/// Clamp a speed multiplier into the supported range.
///
/// NaN falls back to normal speed.
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Custom keyboard remapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Route every emitted key through `keys`.
    pub custom_keyboard: bool,

    /// Physical key for each of the 15 key indexes.
    pub keys: Vec<String>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            custom_keyboard: false,
            keys: sheet::DEFAULT_ALPHABET.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// tracing filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` string).
    /// Default: info
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
