use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const SECS_PER_DAY: i64 = 86_400;

/// Registry-assigned identifier of an irrigation task (zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl TaskId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Time of day at one-minute resolution. Seconds are always zero.
///
/// Serialized as `"HH:MM"`; deserialization goes through [`TimeOfDay::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidTimeOfDay {
                input: format!("{hour}:{minute}"),
                reason: "hour must be 0-23 and minute 0-59".to_string(),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Parse the registry's `HH:MM:SS` column format. `HH:MM` is accepted too;
    /// the seconds component is validated and then dropped.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|e| CoreError::InvalidTimeOfDay {
                input: input.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Offset from local midnight in seconds.
    pub fn seconds_from_midnight(self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// Immutable irrigation task configuration.
///
/// Built once at start-up from the task registry and moved into exactly one
/// scheduler worker. Construction validates that an actuation always fits
/// inside its interval slot (`duration < interval`), so firings never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    interval_minutes: u32,
    duration_seconds: u32,
}

impl Task {
    pub fn new(
        id: TaskId,
        window_start: TimeOfDay,
        window_end: TimeOfDay,
        interval_minutes: u32,
        duration_seconds: u32,
    ) -> Result<Self> {
        if interval_minutes == 0 {
            return Err(CoreError::InvalidTask {
                id,
                reason: "interval must be at least one minute".to_string(),
            });
        }
        let interval_secs = u64::from(interval_minutes) * 60;
        if u64::from(duration_seconds) >= interval_secs {
            return Err(CoreError::InvalidTask {
                id,
                reason: format!(
                    "duration {duration_seconds}s must be shorter than the {interval_secs}s interval"
                ),
            });
        }
        Ok(Self {
            id,
            window_start,
            window_end,
            interval_minutes,
            duration_seconds,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn window_start(&self) -> TimeOfDay {
        self.window_start
    }

    pub fn window_end(&self) -> TimeOfDay {
        self.window_end
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn interval_secs(&self) -> i64 {
        i64::from(self.interval_minutes) * 60
    }

    pub fn duration_secs(&self) -> i64 {
        i64::from(self.duration_seconds)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task #{} {}-{} every {} min for {} s",
            self.id, self.window_start, self.window_end, self.interval_minutes, self.duration_seconds
        )
    }
}
