use thiserror::Error;

use crate::types::TaskId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time of day {input:?}: {reason}")]
    InvalidTimeOfDay { input: String, reason: String },

    #[error("Invalid task #{id}: {reason}")]
    InvalidTask { id: TaskId, reason: String },
}

impl CoreError {
    /// Short error code string used in activity records and `--check` output.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::InvalidTimeOfDay { .. } => "INVALID_TIME_OF_DAY",
            CoreError::InvalidTask { .. } => "INVALID_TASK",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
