//! Interval resolver: subdivides an active segment into fixed-length slots.

use serde::Serialize;

use crate::window::DaySegment;

/// Where "now" sits relative to the slots of an active segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "position", rename_all = "snake_case")]
pub enum SlotPosition {
    /// Exactly on a slot's lower bound: fire now.
    Boundary { index: i64, start: i64, end: i64 },
    /// Strictly inside a slot: wait for its upper bound.
    Inside { index: i64, start: i64, end: i64 },
    /// Past the last whole slot (or outside the segment).
    Remainder,
}

/// Number of whole slots that fit in `segment`.
pub fn slot_count(segment: &DaySegment, interval_secs: i64) -> i64 {
    if interval_secs <= 0 {
        return 0;
    }
    segment.len_secs() / interval_secs
}

/// Locate `now` among the slots `[start + k*i, start + (k+1)*i)` for
/// `k in 0..slot_count`.
pub fn locate_slot(segment: &DaySegment, interval_secs: i64, now: i64) -> SlotPosition {
    if interval_secs <= 0 || now < segment.start {
        return SlotPosition::Remainder;
    }
    let offset = now - segment.start;
    let index = offset / interval_secs;
    if index >= slot_count(segment, interval_secs) {
        return SlotPosition::Remainder;
    }
    let start = segment.start + index * interval_secs;
    let end = start + interval_secs;
    if now == start {
        SlotPosition::Boundary { index, start, end }
    } else {
        SlotPosition::Inside { index, start, end }
    }
}
