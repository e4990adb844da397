//! Real-time playback of compiled keymaps.
//!
//! The [`Scheduler`] replays a [`KeySchedule`](sheet::KeySchedule) through an
//! [`InjectionPort`], scaled by a speed multiplier, in either normal or
//! long-press mode, and broadcasts [`PlaybackEvent`]s as it goes.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autoplay::{PlaybackEvent, PlaybackSettings, Scheduler, SessionId, TracingPort};
//! use sheet::KeySchedule;
//!
//! # async fn demo() {
//! let schedule = KeySchedule::from_json(r#"{"0":["y"],"500":["u"],"1000":[]}"#).unwrap();
//! let scheduler = Scheduler::new(Arc::new(TracingPort), PlaybackSettings::default());
//! let mut events = scheduler.subscribe();
//!
//! scheduler.play(schedule, 0.0, SessionId::generate());
//! while let Ok(event) = events.recv().await {
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! # }
//! ```

pub mod events;
pub mod port;
pub mod scheduler;
pub mod session;

pub use events::PlaybackEvent;
pub use port::{InjectionError, InjectionPort, TracingPort};
pub use scheduler::{Scheduler, SchedulerState, SessionEnd, SessionHandle, RELEASE_MARGIN};
pub use session::{PlayRequest, PlaybackSession, PlaybackSettings, SessionId};
