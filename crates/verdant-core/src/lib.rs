//! Types shared by every Verdant crate.
//!
//! Holds the immutable [`Task`] record handed to each scheduler worker, the
//! minute-resolution [`TimeOfDay`] used for daily windows, and the
//! [`VerdantConfig`] loaded from `verdant.toml` + `VERDANT_*` env vars.

pub mod config;
pub mod error;
pub mod types;

pub use config::VerdantConfig;
pub use error::{CoreError, Result};
pub use types::{Task, TaskId, TimeOfDay, SECS_PER_DAY};
