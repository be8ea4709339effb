use chrono::{DateTime, Offset, TimeZone};
use serde::Serialize;
use tracing::warn;
use verdant_core::{Task, SECS_PER_DAY};

use crate::slot::{locate_slot, SlotPosition};
use crate::window::{day_segments, DailyWindow};

/// What a task should do at a given instant. Sleep values are whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SchedulingDecision {
    /// `now` is a slot's lower bound. Actuate for the task's duration, then
    /// sleep `sleep_after` so the next check lands on `next_slot`.
    Fire {
        slot_start: i64,
        next_slot: i64,
        sleep_after: i64,
    },
    /// Inside a slot that already fired: sleep until its upper bound.
    WaitUntilSlotBoundary { wake_at: i64, sleep: i64 },
    /// Outside the window (or past its last whole slot): sleep until the
    /// next active segment opens.
    WaitUntilWindowOpens { wake_at: i64, sleep: i64 },
}

impl SchedulingDecision {
    pub fn is_fire(&self) -> bool {
        matches!(self, SchedulingDecision::Fire { .. })
    }

    /// Seconds to sleep once any actuation has finished.
    pub fn sleep_secs(&self) -> i64 {
        match *self {
            SchedulingDecision::Fire { sleep_after, .. } => sleep_after,
            SchedulingDecision::WaitUntilSlotBoundary { sleep, .. } => sleep,
            SchedulingDecision::WaitUntilWindowOpens { sleep, .. } => sleep,
        }
    }

    /// Epoch second at which the task should be evaluated again.
    pub fn next_evaluation(&self) -> i64 {
        match *self {
            SchedulingDecision::Fire { next_slot, .. } => next_slot,
            SchedulingDecision::WaitUntilSlotBoundary { wake_at, .. } => wake_at,
            SchedulingDecision::WaitUntilWindowOpens { wake_at, .. } => wake_at,
        }
    }
}

/// Decide what `task` must do at `now`, in `now`'s own local offset.
///
/// Pure: the same task and instant always yield the same decision.
pub fn resolve<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> SchedulingDecision {
    let offset = now.offset().fix().local_minus_utc();
    resolve_at(task, now.timestamp(), offset)
}

/// [`resolve`] on raw epoch seconds plus a UTC offset (seconds east).
pub fn resolve_at(task: &Task, now: i64, utc_offset: i32) -> SchedulingDecision {
    let window = DailyWindow::of(task);
    let frame = day_segments(&window, now, utc_offset);

    let Some(segment) = frame.locate(now) else {
        // The frame always covers `now`; sleeping zero lets the loop clamp
        // and re-evaluate.
        warn!(task_id = %task.id(), now, "instant not covered by any day segment");
        return SchedulingDecision::WaitUntilWindowOpens {
            wake_at: now,
            sleep: 0,
        };
    };

    if !segment.active {
        return SchedulingDecision::WaitUntilWindowOpens {
            wake_at: segment.end,
            sleep: segment.end - now,
        };
    }

    match locate_slot(segment, task.interval_secs(), now) {
        SlotPosition::Boundary { start, end, .. } => SchedulingDecision::Fire {
            slot_start: start,
            next_slot: end,
            sleep_after: task.interval_secs() - task.duration_secs(),
        },
        SlotPosition::Inside { end, .. } => SchedulingDecision::WaitUntilSlotBoundary {
            wake_at: end,
            sleep: end - now,
        },
        SlotPosition::Remainder => {
            // Every active segment recurs 24h after its own start.
            let next_open = segment.start + SECS_PER_DAY;
            SchedulingDecision::WaitUntilWindowOpens {
                wake_at: next_open,
                sleep: next_open - now,
            }
        }
    }
}
