use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;
use tracing::{error, info, warn};
use verdant_core::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One audit entry. `task_id` is `None` for process-level records
/// (start-up, registry loading, shutdown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub task_id: Option<TaskId>,
    pub severity: Severity,
    pub at: DateTime<FixedOffset>,
    pub message: String,
}

impl ActivityRecord {
    pub fn new(
        task_id: Option<TaskId>,
        severity: Severity,
        at: DateTime<FixedOffset>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            severity,
            at,
            message: message.into(),
        }
    }

    pub fn info(task_id: Option<TaskId>, at: DateTime<FixedOffset>, message: impl Into<String>) -> Self {
        Self::new(task_id, Severity::Info, at, message)
    }

    pub fn warn(task_id: Option<TaskId>, at: DateTime<FixedOffset>, message: impl Into<String>) -> Self {
        Self::new(task_id, Severity::Warn, at, message)
    }

    pub fn error(task_id: Option<TaskId>, at: DateTime<FixedOffset>, message: impl Into<String>) -> Self {
        Self::new(task_id, Severity::Error, at, message)
    }

    /// Render the audit line (without trailing newline).
    ///
    /// Date fields are local to the record's offset and deliberately not
    /// zero-padded; downstream spreadsheets split on `:`.
    pub fn to_line(&self) -> String {
        let at = &self.at;
        format!(
            "{},-,{}:{}:{}:{}:{}:{}:, {}",
            at.timestamp(),
            at.year(),
            at.month(),
            at.day(),
            at.hour(),
            at.minute(),
            at.second(),
            self.message
        )
    }

    /// Mirror the record into diagnostic tracing at its own severity.
    pub fn trace(&self) {
        let task_id = self.task_id.map(|id| id.get()).unwrap_or(0);
        match self.severity {
            Severity::Info => info!(task_id, "{}", self.message),
            Severity::Warn => warn!(task_id, "{}", self.message),
            Severity::Error => error!(task_id, "{}", self.message),
        }
    }
}
