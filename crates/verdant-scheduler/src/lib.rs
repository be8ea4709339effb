//! Daily-window interval scheduling for irrigation tasks.
//!
//! # Overview
//!
//! Each [`Task`](verdant_core::Task) runs in its own [`engine::TaskRunner`].
//! Every iteration the runner reads the clock and asks [`schedule::resolve`]
//! for a [`SchedulingDecision`]:
//!
//! 1. [`window`] splits the 24h frame around "now" into active/inactive
//!    [`window::DaySegment`]s (handles windows that wrap past midnight and
//!    all-day windows).
//! 2. [`slot`] cuts the active segment into `interval` slots and checks
//!    whether "now" is a slot boundary.
//!
//! | Decision                | Runner action                                 |
//! |-------------------------|-----------------------------------------------|
//! | `Fire`                  | engage → hold `duration` → release, then sleep |
//! | `WaitUntilSlotBoundary` | sleep to the end of the current slot          |
//! | `WaitUntilWindowOpens`  | sleep to the start of the next active segment |
//!
//! Missed instants are never replayed; the next evaluation simply resolves
//! from the wall clock again.

pub mod clock;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod slot;
pub mod window;

pub use clock::{Clock, SystemClock, TokioClock};
pub use engine::{SchedulerEngine, Shared, TaskRunner};
pub use error::{Result, SchedulerError};
pub use schedule::{resolve, resolve_at, SchedulingDecision};
pub use window::{DailyWindow, DayFrame, DaySegment, WindowKind};
