use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ActivityError, Result};
use crate::record::ActivityRecord;

/// Destination for activity records. Implementations serialize internally so
/// concurrent workers can share one `Arc<dyn ActivitySink>`.
pub trait ActivitySink: Send + Sync {
    fn append(&self, record: &ActivityRecord) -> Result<()>;
}

/// File-backed activity log.
///
/// The target is reopened in append mode for every record, so external
/// rotation (move + recreate) is picked up without a restart.
pub struct FileActivityLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the log and verify it can be opened for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let log = Self::new(path);
        {
            let _guard = log.lock.lock().unwrap();
            log.open_file()?;
        }
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ActivityError::Open {
                path: self.path.clone(),
                source,
            })
    }
}

impl ActivitySink for FileActivityLog {
    fn append(&self, record: &ActivityRecord) -> Result<()> {
        record.trace();
        let line = record.to_line();

        let _guard = self.lock.lock().unwrap();
        let mut file = self.open_file()?;
        writeln!(file, "{line}").map_err(|source| ActivityError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// In-memory sink used by tests and `--check` runs.
#[derive(Default)]
pub struct MemoryActivityLog {
    records: Mutex<Vec<ActivityRecord>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(ActivityRecord::to_line)
            .collect()
    }
}

impl ActivitySink for MemoryActivityLog {
    fn append(&self, record: &ActivityRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
