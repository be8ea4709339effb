//! Drives the physical output behind each task.
//!
//! The scheduler only ever calls [`Actuator::engage`] followed by
//! [`Actuator::release`] for the same task; both are idempotent.

pub mod error;
pub mod gpio;

pub use error::{ActuatorError, Result};
pub use gpio::GpioActuator;

use tracing::info;
use verdant_core::TaskId;

pub trait Actuator: Send + Sync {
    /// Switch the task's output on.
    fn engage(&self, task: TaskId) -> Result<()>;

    /// Switch the task's output off.
    fn release(&self, task: TaskId) -> Result<()>;
}

/// Dry-run actuator: records intent in the trace log, touches no hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogActuator;

impl Actuator for LogActuator {
    fn engage(&self, task: TaskId) -> Result<()> {
        info!(task_id = %task, "dry-run: output on");
        Ok(())
    }

    fn release(&self, task: TaskId) -> Result<()> {
        info!(task_id = %task, "dry-run: output off");
        Ok(())
    }
}
