use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use verdant_core::config::PinConfig;
use verdant_core::TaskId;

use crate::error::{ActuatorError, Result};
use crate::Actuator;

/// Linux sysfs GPIO actuator (`/sys/class/gpio`).
///
/// Every mapped line is exported and configured as an output driven low at
/// construction time, so a half-initialised board fails at start-up rather
/// than at the first firing.
pub struct GpioActuator {
    root: PathBuf,
    pins: HashMap<TaskId, u32>,
}

impl GpioActuator {
    pub fn new(root: impl Into<PathBuf>, pins: &[PinConfig]) -> Result<Self> {
        let actuator = Self {
            root: root.into(),
            pins: pins.iter().map(|p| (p.task_id, p.gpio)).collect(),
        };
        for &pin in actuator.pins.values() {
            actuator.export(pin)?;
            actuator.write(pin, "direction", "out")?;
            actuator.write(pin, "value", "0")?;
        }
        info!(root = %actuator.root.display(), lines = actuator.pins.len(), "GPIO actuator ready");
        Ok(actuator)
    }

    pub fn pin_for(&self, task: TaskId) -> Option<u32> {
        self.pins.get(&task).copied()
    }

    fn line_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn export(&self, pin: u32) -> Result<()> {
        if self.line_dir(pin).is_dir() {
            return Ok(());
        }
        let path = self.root.join("export");
        debug!(pin, "exporting GPIO line");
        write_sysfs(pin, &path, &pin.to_string())
    }

    fn write(&self, pin: u32, attr: &str, value: &str) -> Result<()> {
        let path = self.line_dir(pin).join(attr);
        write_sysfs(pin, &path, value)
    }

    fn set(&self, task: TaskId, value: &str) -> Result<()> {
        let pin = self.pin_for(task).ok_or(ActuatorError::UnmappedTask(task))?;
        debug!(task_id = %task, pin, value, "GPIO write");
        self.write(pin, "value", value)
    }
}

fn write_sysfs(pin: u32, path: &Path, value: &str) -> Result<()> {
    std::fs::write(path, value).map_err(|source| ActuatorError::Io {
        pin,
        path: path.to_path_buf(),
        source,
    })
}

impl Actuator for GpioActuator {
    fn engage(&self, task: TaskId) -> Result<()> {
        self.set(task, "1")
    }

    fn release(&self, task: TaskId) -> Result<()> {
        self.set(task, "0")
    }
}
