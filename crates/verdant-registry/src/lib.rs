//! Loads irrigation task definitions from SQLite.
//!
//! The registry is read exactly once at start-up. Disabled rows are ignored,
//! malformed rows are reported in [`LoadedTasks::rejected`] and skipped, and
//! at most `max_tasks` enabled rows are scheduled.

pub mod db;
pub mod error;
pub mod registry;

pub use error::{RegistryError, Result};
pub use registry::{LoadedTasks, RejectReason, RejectedRow, TaskRegistry, TaskRow};
