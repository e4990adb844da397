//! The boundary to whatever actually presses keys.

use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// A key press could not be delivered.
///
/// The scheduler never retries: the session that hit it is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    #[error("failed to press {key:?}: {reason}")]
    Press { key: String, reason: String },

    #[error("injection port unavailable: {0}")]
    Unavailable(String),
}

/// OS-level key injection.
///
/// `hold` is `Some` in long-press mode: the key stays down for that long and
/// the port releases it. With `None` the port picks its own press/release
/// timing. Implementations must return promptly; the scheduler calls this
/// from its dispatch task.
pub trait InjectionPort: Send + Sync {
    fn press(&self, key: &str, hold: Option<Duration>) -> Result<(), InjectionError>;
}

/// Dry-run port that logs every press.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPort;

impl InjectionPort for TracingPort {
    fn press(&self, key: &str, hold: Option<Duration>) -> Result<(), InjectionError> {
        match hold {
            Some(hold) => info!(key, hold_ms = hold.as_millis() as u64, "press"),
            None => info!(key, "press"),
        }
        Ok(())
    }
}
