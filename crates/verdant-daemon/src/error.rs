use thiserror::Error;
use verdant_activity::ActivityError;
use verdant_actuator::ActuatorError;
use verdant_core::CoreError;
use verdant_registry::RegistryError;
use verdant_scheduler::SchedulerError;

/// Fatal daemon failures. Each maps to a distinct process exit code so
/// supervisors (systemd, runit) can tell them apart.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("task registry unavailable: {0}")]
    RegistryConnect(#[source] RegistryError),

    #[error("task registry query failed: {0}")]
    RegistryQuery(#[source] RegistryError),

    #[error("activity log failure: {0}")]
    ActivityLog(#[from] ActivityError),

    #[error("could not start workers: {0}")]
    WorkerCreate(#[from] ActuatorError),

    #[error("no enabled task could be scheduled")]
    NoTasks,

    #[error("worker join failed: {0}")]
    WorkerJoin(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error("could not write report: {0}")]
    Report(#[from] serde_json::Error),
}

impl DaemonError {
    pub fn exit_code(&self) -> u8 {
        match self {
            DaemonError::RegistryConnect(_) => 1,
            DaemonError::WorkerJoin(_) => 2,
            DaemonError::RegistryQuery(_) => 3,
            DaemonError::ActivityLog(_) => 4,
            DaemonError::WorkerCreate(_) | DaemonError::NoTasks => 5,
            DaemonError::Config(_) | DaemonError::Report(_) => 6,
        }
    }
}

impl From<RegistryError> for DaemonError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Connect(_) => DaemonError::RegistryConnect(e),
            RegistryError::Query(_) => DaemonError::RegistryQuery(e),
        }
    }
}

impl From<SchedulerError> for DaemonError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::Activity(inner) => DaemonError::ActivityLog(inner),
            SchedulerError::Join(reason) => DaemonError::WorkerJoin(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;
