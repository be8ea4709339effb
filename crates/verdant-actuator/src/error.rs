use std::path::PathBuf;

use thiserror::Error;
use verdant_core::TaskId;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("GPIO {pin} I/O error on {path}: {source}")]
    Io {
        pin: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no GPIO line mapped to task #{0}")]
    UnmappedTask(TaskId),
}

pub type Result<T> = std::result::Result<T, ActuatorError>;
