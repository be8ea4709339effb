//! The append-only activity log shared by all workers.
//!
//! Callers build an [`ActivityRecord`]; the [`ActivitySink`] decides how it is
//! rendered. [`FileActivityLog`] writes the CSV-ish audit format
//!
//! ```text
//! <epoch_seconds>,-,<year>:<month>:<day>:<hour>:<min>:<sec>:, <message>
//! ```
//!
//! one line per record, serialized across workers by a single mutex.

pub mod error;
pub mod record;
pub mod sink;

pub use error::{ActivityError, Result};
pub use record::{ActivityRecord, Severity};
pub use sink::{ActivitySink, FileActivityLog, MemoryActivityLog};
