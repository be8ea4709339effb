use std::path::PathBuf;

use thiserror::Error;

/// Failures of the activity log. Always fatal to the daemon: running without
/// an audit trail is not allowed.
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("could not open activity log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write activity log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ActivityError>;
