//! Sessions, play requests, and the settings a session is started with.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sheet::{KeySchedule, KeyTranslator};
use skyconf::{clamp_speed, SkyConfig};

/// Opaque token identifying one playback attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback settings, captured when a session starts.
#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    /// Tempo multiplier, kept within `MIN_SPEED..=MAX_SPEED`.
    pub speed: f64,
    pub long_press_mode: bool,
    /// Hold for the last keys before silence, in long-press mode.
    pub delay_next: Duration,
    pub translator: KeyTranslator,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            long_press_mode: false,
            delay_next: Duration::from_secs(1),
            translator: KeyTranslator::identity(),
        }
    }
}

impl PlaybackSettings {
    pub fn from_config(config: &SkyConfig) -> Self {
        Self {
            speed: config.panel.clamped_speed(),
            long_press_mode: config.panel.long_press_mode,
            delay_next: Duration::try_from_secs_f64(config.panel.delay_next)
                .unwrap_or(Duration::from_secs(1)),
            translator: KeyTranslator::from_settings(
                config.keyboard.custom_keyboard,
                &config.keyboard.keys,
            ),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = clamp_speed(speed);
        self
    }

    pub fn with_long_press(mut self, enabled: bool) -> Self {
        self.long_press_mode = enabled;
        self
    }

    pub fn with_delay_next(mut self, delay_next: Duration) -> Self {
        self.delay_next = delay_next;
        self
    }

    pub fn with_translator(mut self, translator: KeyTranslator) -> Self {
        self.translator = translator;
        self
    }
}

/// One playback attempt.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub schedule: Arc<KeySchedule>,
    pub start_offset_sec: f64,
    pub speed: f64,
    pub long_press_mode: bool,
    pub delay_next: Duration,
    pub translator: KeyTranslator,
}

impl PlaybackSession {
    pub fn new(
        id: SessionId,
        schedule: Arc<KeySchedule>,
        start_offset_sec: f64,
        settings: &PlaybackSettings,
    ) -> Self {
        Self {
            id,
            schedule,
            start_offset_sec: if start_offset_sec.is_finite() {
                start_offset_sec.max(0.0)
            } else {
                0.0
            },
            speed: clamp_speed(settings.speed),
            long_press_mode: settings.long_press_mode,
            delay_next: settings.delay_next,
            translator: settings.translator.clone(),
        }
    }

    /// Schedule entries still to play, in order.
    pub fn steps(&self) -> Vec<(u64, Vec<String>)> {
        self.schedule
            .from_offset(self.start_offset_sec)
            .iter()
            .map(|(time, keys)| (time, keys.to_vec()))
            .collect()
    }

    /// Wall-clock wait for a gap of `raw_ms` schedule milliseconds.
    pub fn scaled_delay(&self, raw_ms: u64) -> Duration {
        Duration::from_millis((raw_ms as f64 / self.speed).floor() as u64)
    }
}

/// A request from the host to start or stop playback.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub keys: KeySchedule,
    /// Start offset in seconds.
    pub sec: f64,
    pub session_id: SessionId,
    /// `false` means stop.
    pub is_play: bool,
}

impl PlayRequest {
    pub fn play(keys: KeySchedule, sec: f64) -> Self {
        Self {
            keys,
            sec,
            session_id: SessionId::generate(),
            is_play: true,
        }
    }

    pub fn stop() -> Self {
        Self {
            keys: KeySchedule::new(),
            sec: 0.0,
            session_id: SessionId::generate(),
            is_play: false,
        }
    }
}
