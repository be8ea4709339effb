//! `verdant --check`: one JSON line per loaded task with the decision the
//! scheduler would take right now, followed by one line per skipped row.

use std::io::Write;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use verdant_core::config::VerdantConfig;
use verdant_core::Task;
use verdant_registry::{LoadedTasks, RejectedRow, TaskRegistry};
use verdant_scheduler::{resolve, Clock, DailyWindow, SchedulingDecision, SystemClock, WindowKind};

use crate::error::Result;

#[derive(Debug, Serialize)]
struct TaskReport<'a> {
    task: &'a Task,
    window: WindowKind,
    decision: SchedulingDecision,
}

#[derive(Debug, Serialize)]
struct RejectedReport<'a> {
    rejected: &'a RejectedRow,
}

/// Report against the configured registry. The database is opened
/// read-only, so a wrong path fails instead of creating an empty registry.
pub fn run(config: &VerdantConfig, out: impl Write) -> Result<()> {
    let registry = TaskRegistry::open_read_only(&config.database.path)?;
    let loaded = registry.load_tasks(config.registry.max_tasks)?;
    report(&loaded, &SystemClock.now(), out)
}

pub fn report<Tz: TimeZone>(
    loaded: &LoadedTasks,
    now: &DateTime<Tz>,
    mut out: impl Write,
) -> Result<()> {
    for task in &loaded.tasks {
        let line = TaskReport {
            task,
            window: DailyWindow::of(task).kind(),
            decision: resolve(task, now),
        };
        emit(&mut out, &line)?;
    }
    for rejected in &loaded.rejected {
        emit(&mut out, &RejectedReport { rejected })?;
    }
    Ok(())
}

fn emit(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n").map_err(serde_json::Error::io)?;
    Ok(())
}
