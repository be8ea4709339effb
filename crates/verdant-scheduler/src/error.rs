use thiserror::Error;
use verdant_activity::ActivityError;

/// Errors that stop a scheduler worker.
///
/// Actuator failures are not listed: they are logged and the loop carries on.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The activity log became unwritable. Fatal to the whole process.
    #[error("Activity log failure: {0}")]
    Activity(#[from] ActivityError),

    /// A worker task panicked or was aborted.
    #[error("Worker join failure: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
