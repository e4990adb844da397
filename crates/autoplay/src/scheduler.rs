//! The playback engine.
//!
//! One [`Scheduler`] owns at most one live session. Starting a session
//! spawns two tasks that share nothing but the session's generation number:
//!
//! - **dispatch** walks the schedule, presses keys, and sleeps between steps
//! - **progress** ticks once per scaled second and reports elapsed seconds
//!
//! Stopping or superseding a session bumps the generation. Both tasks
//! compare it after every sleep and exit quietly once it has moved on, so a
//! stale session presses nothing after its successor starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use sheet::KeySchedule;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::events::PlaybackEvent;
use crate::port::{InjectionError, InjectionPort};
use crate::session::{PlayRequest, PlaybackSession, PlaybackSettings, SessionId};

/// Released this long before the next action in long-press mode, covering
/// injection and release latency.
pub const RELEASE_MARGIN: Duration = Duration::from_millis(35);

const EVENT_CAPACITY: usize = 256;

/// Whether anything is playing.
#[derive(Debug, Clone)]
pub enum SchedulerState {
    Idle,
    Playing(PlaybackSession),
}

impl SchedulerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, SchedulerState::Playing(_))
    }
}

/// How a session's dispatch task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Played through to the sentinel.
    Finished,
    /// Stopped or superseded before the end.
    Cancelled,
    /// A key press failed and the session was stopped.
    Failed(InjectionError),
}

/// Handle to a started session.
#[derive(Debug)]
pub struct SessionHandle {
    pub id: SessionId,
    task: JoinHandle<SessionEnd>,
}

impl SessionHandle {
    /// Wait for the dispatch task to end.
    pub async fn wait(self) -> Result<SessionEnd, JoinError> {
        self.task.await
    }
}

struct LiveSession {
    generation: u64,
    session: PlaybackSession,
}

struct Inner {
    port: Arc<dyn InjectionPort>,
    settings: RwLock<PlaybackSettings>,
    live: Mutex<Option<LiveSession>>,
    generation: AtomicU64,
    events: broadcast::Sender<PlaybackEvent>,
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, Option<LiveSession>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Retire the live session if it is still `generation`, emitting the
    /// terminal event. Returns false if someone else already resolved it.
    fn resolve(&self, generation: u64, finished: bool) -> bool {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(live) if live.generation == generation => {}
            _ => return false,
        }
        let Some(live) = slot.take() else {
            return false;
        };
        self.generation.fetch_add(1, Ordering::SeqCst);

        let session = live.session.id;
        if finished {
            info!(session = %session, "playback finished");
            self.emit(PlaybackEvent::Finished { session });
        } else {
            info!(session = %session, "playback stopped");
            self.emit(PlaybackEvent::Stopped { session });
        }
        true
    }
}

/// Drives an [`InjectionPort`] from compiled key schedules.
///
/// Cloning is cheap and every clone controls the same live session. Sessions
/// run on the ambient tokio runtime.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(port: Arc<dyn InjectionPort>, settings: PlaybackSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                port,
                settings: RwLock::new(settings),
                live: Mutex::new(None),
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    /// Receive progress and end-of-session events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Settings for sessions started from now on. A live session keeps the
    /// settings it started with.
    pub fn set_settings(&self, settings: PlaybackSettings) {
        *self
            .inner
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn state(&self) -> SchedulerState {
        match self.inner.slot().as_ref() {
            Some(live) => SchedulerState::Playing(live.session.clone()),
            None => SchedulerState::Idle,
        }
    }

    /// Handle a host request: play, or stop when `is_play` is false.
    pub fn handle(&self, request: PlayRequest) -> Option<SessionHandle> {
        if request.is_play {
            Some(self.play(request.keys, request.sec, request.session_id))
        } else {
            self.stop();
            None
        }
    }

    /// Start playing `schedule` from `start_offset_sec`.
    ///
    /// Always succeeds. A session that was already live is stopped first and
    /// gets its `Stopped` event before this returns.
    pub fn play(
        &self,
        schedule: impl Into<Arc<KeySchedule>>,
        start_offset_sec: f64,
        id: SessionId,
    ) -> SessionHandle {
        let session = PlaybackSession::new(id, schedule.into(), start_offset_sec, &self.settings());

        let generation = {
            let mut slot = self.inner.slot();
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(previous) = slot.take() {
                info!(
                    session = %previous.session.id,
                    next = %session.id,
                    "playback superseded"
                );
                self.inner.emit(PlaybackEvent::Stopped {
                    session: previous.session.id,
                });
            }
            *slot = Some(LiveSession {
                generation,
                session: session.clone(),
            });
            generation
        };

        info!(
            session = %session.id,
            entries = session.schedule.len(),
            offset_sec = session.start_offset_sec,
            speed = session.speed,
            long_press = session.long_press_mode,
            "playback started"
        );

        tokio::spawn(run_progress(
            Arc::clone(&self.inner),
            generation,
            session.clone(),
        ));
        let id = session.id.clone();
        let task = tokio::spawn(run_dispatch(Arc::clone(&self.inner), generation, session));

        SessionHandle { id, task }
    }

    /// Stop the live session, if any. Returns the session that was stopped.
    pub fn stop(&self) -> Option<SessionId> {
        let mut slot = self.inner.slot();
        let live = slot.take()?;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        info!(session = %live.session.id, "playback stopped");
        self.inner.emit(PlaybackEvent::Stopped {
            session: live.session.id.clone(),
        });
        Some(live.session.id)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("playing", &self.state().is_playing())
            .finish()
    }
}

fn press_all(
    inner: &Inner,
    session: &PlaybackSession,
    keys: &[String],
    hold: Option<Duration>,
) -> Result<(), InjectionError> {
    for key in keys {
        let physical = session.translator.translate(key);
        inner.port.press(physical, hold)?;
    }
    Ok(())
}

async fn run_dispatch(inner: Arc<Inner>, generation: u64, session: PlaybackSession) -> SessionEnd {
    let steps = session.steps();
    let gap_hold = session.delay_next.saturating_sub(RELEASE_MARGIN);

    for pair in steps.windows(2) {
        let (prev_time, prev_keys) = &pair[0];
        let (next_time, next_keys) = &pair[1];
        let delay = session.scaled_delay(next_time - prev_time);

        if !inner.is_live(generation) {
            debug!(session = %session.id, "dispatch cancelled");
            return SessionEnd::Cancelled;
        }

        let hold = session.long_press_mode.then(|| {
            if next_keys.is_empty() {
                gap_hold
            } else {
                delay.saturating_sub(RELEASE_MARGIN)
            }
        });

        if let Err(e) = press_all(&inner, &session, prev_keys, hold) {
            return fail(&inner, generation, &session, e);
        }
        debug!(
            session = %session.id,
            time_ms = *prev_time,
            keys = prev_keys.len(),
            delay_ms = delay.as_millis() as u64,
            "dispatched step"
        );

        tokio::time::sleep(delay).await;
    }

    if !inner.is_live(generation) {
        debug!(session = %session.id, "dispatch cancelled");
        return SessionEnd::Cancelled;
    }

    if let Some((_, last_keys)) = steps.last() {
        let hold = session.long_press_mode.then_some(gap_hold);
        if let Err(e) = press_all(&inner, &session, last_keys, hold) {
            return fail(&inner, generation, &session, e);
        }
    }

    if inner.resolve(generation, true) {
        SessionEnd::Finished
    } else {
        SessionEnd::Cancelled
    }
}

fn fail(
    inner: &Inner,
    generation: u64,
    session: &PlaybackSession,
    error: InjectionError,
) -> SessionEnd {
    warn!(session = %session.id, error = %error, "key injection failed, stopping playback");
    inner.resolve(generation, false);
    SessionEnd::Failed(error)
}

/// Report elapsed whole seconds, one tick per scaled second.
///
/// The first tick carries `floor(offset) + 1`; the starting second itself is
/// never reported, since the caller already knows where it asked to start.
async fn run_progress(inner: Arc<Inner>, generation: u64, session: PlaybackSession) {
    let total = session.schedule.total_seconds();
    let tick = Duration::from_millis((1000.0 / session.speed).floor() as u64);
    let mut seconds = session.start_offset_sec.trunc() as u64;

    while seconds < total {
        tokio::time::sleep(tick).await;
        if !inner.is_live(generation) {
            return;
        }
        seconds += 1;
        inner.emit(PlaybackEvent::Progress {
            session: session.id.clone(),
            seconds,
        });
    }
}
