use std::fmt;
use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};
use serde::Serialize;
use tracing::{debug, info, warn};
use verdant_core::{Task, TaskId, TimeOfDay};

use crate::db::init_db;
use crate::error::{RegistryError, Result};

/// A raw `irrigation_table` row, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub active: bool,
    pub start_time: String,
    pub end_time: String,
    pub freq: i64,
    pub duration: i64,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            active: row.get::<_, i64>(1)? != 0,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            freq: row.get(4)?,
            duration: row.get(5)?,
        })
    }

    /// Validate the row into a schedulable [`Task`].
    pub fn to_task(&self) -> std::result::Result<Task, RejectReason> {
        let id = u32::try_from(self.id)
            .map(TaskId)
            .map_err(|_| RejectReason::Malformed(format!("id {} out of range", self.id)))?;
        let start = TimeOfDay::parse(&self.start_time)
            .map_err(|e| RejectReason::Malformed(e.to_string()))?;
        let end = TimeOfDay::parse(&self.end_time)
            .map_err(|e| RejectReason::Malformed(e.to_string()))?;
        let freq = u32::try_from(self.freq)
            .map_err(|_| RejectReason::Malformed(format!("freq {} out of range", self.freq)))?;
        let duration = u32::try_from(self.duration).map_err(|_| {
            RejectReason::Malformed(format!("duration {} out of range", self.duration))
        })?;
        Task::new(id, start, end, freq, duration).map_err(|e| RejectReason::Invalid(e.to_string()))
    }
}

/// Why an enabled row was not scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// Column missing, wrong type, or unparseable.
    Malformed(String),
    /// Parsed, but violates a task invariant (e.g. duration ≥ interval).
    Invalid(String),
    /// All `max_tasks` slots are taken.
    NoFreeSlot { max_tasks: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed(detail) => write!(f, "malformed row: {detail}"),
            RejectReason::Invalid(detail) => write!(f, "invalid task: {detail}"),
            RejectReason::NoFreeSlot { max_tasks } => {
                write!(f, "no free task slot (max {max_tasks})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// Row id, when it could be read at all.
    pub id: Option<i64>,
    pub reason: RejectReason,
}

/// Outcome of a registry load: the schedulable tasks plus every enabled row
/// that was skipped and why.
#[derive(Debug, Default)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub rejected: Vec<RejectedRow>,
}

/// Read-once task registry backed by the `irrigation_table` SQLite table.
pub struct TaskRegistry {
    conn: Connection,
}

impl TaskRegistry {
    /// Open the registry database at `path`, creating the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(RegistryError::Connect)?;
        info!(path = %path.display(), "task registry opened");
        Self::from_connection(conn)
    }

    /// Open an existing registry without creating the file or its schema.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(RegistryError::Connect)?;
        debug!(path = %path.display(), "task registry opened read-only");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Insert or replace a row. Used for provisioning and tests.
    pub fn insert_task(&self, row: &TaskRow) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO irrigation_table
             (id, active, start_time, end_time, freq, duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                row.id,
                i64::from(row.active),
                row.start_time,
                row.end_time,
                row.freq,
                row.duration
            ],
        )?;
        Ok(())
    }

    /// Load every enabled task, up to `max_tasks`, in id order.
    ///
    /// Only a failing query is an error; bad rows end up in
    /// [`LoadedTasks::rejected`] and loading continues with the next row.
    pub fn load_tasks(&self, max_tasks: usize) -> Result<LoadedTasks> {
        let mut stmt = self.conn.prepare(
            "SELECT id, active, start_time, end_time, freq, duration
             FROM irrigation_table ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0).ok(), TaskRow::from_row(row)))
        })?;

        let mut loaded = LoadedTasks::default();

        for item in rows {
            let (id, parsed) = item?;
            let row = match parsed {
                Ok(row) => row,
                Err(e) => {
                    warn!(row_id = ?id, "skipping unreadable registry row: {e}");
                    loaded.rejected.push(RejectedRow {
                        id,
                        reason: RejectReason::Malformed(e.to_string()),
                    });
                    continue;
                }
            };

            if !row.active {
                debug!(row_id = row.id, "registry row disabled");
                continue;
            }

            let reason = match row.to_task() {
                Ok(_) if loaded.tasks.len() >= max_tasks => RejectReason::NoFreeSlot { max_tasks },
                Ok(task) => {
                    debug!(task_id = %task.id(), "{task}");
                    loaded.tasks.push(task);
                    continue;
                }
                Err(reason) => reason,
            };
            warn!(row_id = row.id, %reason, "skipping registry row");
            loaded.rejected.push(RejectedRow {
                id: Some(row.id),
                reason,
            });
        }

        info!(
            tasks = loaded.tasks.len(),
            rejected = loaded.rejected.len(),
            "task registry loaded"
        );
        Ok(loaded)
    }
}
