use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::TaskId;

pub const DEFAULT_CONFIG_PATH: &str = "verdant.toml";
pub const DEFAULT_DB_PATH: &str = "verdant.db";
pub const DEFAULT_ACTIVITY_LOG: &str = "log_file.csv";
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";
pub const DEFAULT_MAX_TASKS: usize = 6;
pub const DEFAULT_MIN_SLEEP_SECS: u64 = 1;

/// Top-level config (verdant.toml + VERDANT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdantConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Hard cap on concurrently scheduled tasks; extra enabled rows are skipped.
    #[serde(default = "default_max_tasks")]
    pub max_tasks: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Append-only audit log shared by every worker.
    #[serde(default = "default_activity_path")]
    pub path: String,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            path: default_activity_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ActuatorMode {
    /// Dry run: actuations are only traced.
    #[default]
    Log,
    /// Linux sysfs GPIO (`/sys/class/gpio`).
    Gpio,
}

/// Maps a task to the GPIO line that drives its valve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinConfig {
    pub task_id: TaskId,
    pub gpio: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorConfig {
    #[serde(default)]
    pub mode: ActuatorMode,
    #[serde(default = "default_gpio_root")]
    pub gpio_root: String,
    #[serde(default = "default_pins")]
    pub pins: Vec<PinConfig>,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            mode: ActuatorMode::default(),
            gpio_root: default_gpio_root(),
            pins: default_pins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Floor applied to degenerate (zero or negative) sleep computations.
    #[serde(default = "default_min_sleep_secs")]
    pub min_sleep_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_sleep_secs: DEFAULT_MIN_SLEEP_SECS,
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}
fn default_max_tasks() -> usize {
    DEFAULT_MAX_TASKS
}
fn default_activity_path() -> String {
    DEFAULT_ACTIVITY_LOG.to_string()
}
fn default_gpio_root() -> String {
    DEFAULT_GPIO_ROOT.to_string()
}
fn default_min_sleep_secs() -> u64 {
    DEFAULT_MIN_SLEEP_SECS
}
// Zone 1 is wired to BCM GPIO 4 on the reference board.
fn default_pins() -> Vec<PinConfig> {
    vec![PinConfig {
        task_id: TaskId(1),
        gpio: 4,
    }]
}

impl VerdantConfig {
    /// Load config from a TOML file with VERDANT_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `VERDANT_REGISTRY__MAX_TASKS=4` or `VERDANT_ACTUATOR__MODE=gpio`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);

        let config: VerdantConfig = Figment::from(Serialized::defaults(VerdantConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("VERDANT_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.registry.max_tasks == 0 {
            return Err(crate::error::CoreError::Config(
                "registry.max_tasks must be at least 1".to_string(),
            ));
        }
        if self.scheduler.min_sleep_secs == 0 {
            return Err(crate::error::CoreError::Config(
                "scheduler.min_sleep_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
