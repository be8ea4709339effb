//! Window classifier: splits the 24h frame around "now" into active and
//! inactive day segments for a task's daily window.
//!
//! ```text
//!            DAY n-1           |           DAY n            |          DAY n+1
//!  Daytime:   start ... end    |    start ... end           |    start ... end
//!                      [ inactive  )[ active  )[ inactive             )
//!  Overnight: end ... start    |    end ... start           |    end ... start
//!            [ active          )[ inactive   )[ active                )
//! ```
//!
//! Segments are half-open, expressed in epoch seconds, and tile time with no
//! gap or overlap, so exactly one of them contains "now".

use serde::Serialize;
use verdant_core::{Task, TimeOfDay, SECS_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// `start < end`: the window lies within one calendar day.
    Daytime,
    /// `start > end`: the window wraps past midnight.
    Overnight,
    /// `start == end`: active around the clock.
    AllDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DailyWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn of(task: &Task) -> Self {
        Self::new(task.window_start(), task.window_end())
    }

    pub fn kind(&self) -> WindowKind {
        use std::cmp::Ordering;
        match self.start.cmp(&self.end) {
            Ordering::Less => WindowKind::Daytime,
            Ordering::Greater => WindowKind::Overnight,
            Ordering::Equal => WindowKind::AllDay,
        }
    }
}

/// Half-open span `[start, end)` of epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySegment {
    pub start: i64,
    pub end: i64,
    pub active: bool,
}

impl DaySegment {
    fn new(start: i64, end: i64, active: bool) -> Self {
        Self { start, end, active }
    }

    pub fn contains(&self, t: i64) -> bool {
        self.start <= t && t < self.end
    }

    pub fn len_secs(&self) -> i64 {
        self.end - self.start
    }
}

/// Ordered, contiguous segments covering the day that contains "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayFrame {
    segments: Vec<DaySegment>,
}

impl DayFrame {
    pub fn segments(&self) -> &[DaySegment] {
        &self.segments
    }

    /// The segment containing `t`, if `t` falls inside the frame.
    pub fn locate(&self, t: i64) -> Option<&DaySegment> {
        self.segments.iter().find(|s| s.contains(t))
    }
}

/// Epoch second of local midnight for the day containing `now`.
///
/// `utc_offset` is the local offset east of UTC in seconds, taken from the
/// current instant; DST transitions inside the day are not re-resolved.
pub fn local_midnight(now: i64, utc_offset: i32) -> i64 {
    let local = now + i64::from(utc_offset);
    local - local.rem_euclid(SECS_PER_DAY) - i64::from(utc_offset)
}

/// Build the day segments for `window` around `now`.
pub fn day_segments(window: &DailyWindow, now: i64, utc_offset: i32) -> DayFrame {
    let midnight = local_midnight(now, utc_offset);
    let start = midnight + window.start.seconds_from_midnight();
    let end = midnight + window.end.seconds_from_midnight();

    let segments = match window.kind() {
        WindowKind::Daytime => vec![
            DaySegment::new(end - SECS_PER_DAY, start, false),
            DaySegment::new(start, end, true),
            DaySegment::new(end, start + SECS_PER_DAY, false),
        ],
        WindowKind::Overnight => vec![
            DaySegment::new(start - SECS_PER_DAY, end, true),
            DaySegment::new(end, start, false),
            DaySegment::new(start, end + SECS_PER_DAY, true),
        ],
        WindowKind::AllDay => {
            // Anchor on the most recent occurrence of the window time so the
            // firing slots keep their phase across midnight.
            let anchor = if now >= start { start } else { start - SECS_PER_DAY };
            vec![DaySegment::new(anchor, anchor + SECS_PER_DAY, true)]
        }
    };

    DayFrame { segments }
}
