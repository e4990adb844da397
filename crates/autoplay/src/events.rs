//! Events the scheduler reports to the host.

use crate::session::SessionId;
use serde::Serialize;

/// Broadcast to every [`Scheduler::subscribe`](crate::Scheduler::subscribe)r.
///
/// Each session resolves exactly once, as either `Finished` or `Stopped`.
/// Hosts may auto-advance on `Finished` (loop mode) but never on `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Whole seconds elapsed in the piece.
    Progress { session: SessionId, seconds: u64 },
    /// Reached the end of the schedule.
    Finished { session: SessionId },
    /// Stopped explicitly, superseded, or aborted by an injection failure.
    Stopped { session: SessionId },
}

impl PlaybackEvent {
    pub fn session(&self) -> &SessionId {
        match self {
            PlaybackEvent::Progress { session, .. }
            | PlaybackEvent::Finished { session }
            | PlaybackEvent::Stopped { session } => session,
        }
    }

    /// True for `Finished` and `Stopped`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlaybackEvent::Progress { .. })
    }
}
