use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use verdant_activity::{ActivityRecord, ActivitySink, FileActivityLog};
use verdant_actuator::{Actuator, GpioActuator, LogActuator};
use verdant_core::config::{ActuatorMode, VerdantConfig};
use verdant_registry::{LoadedTasks, TaskRegistry};
use verdant_scheduler::{Clock, SchedulerEngine, Shared, SystemClock};

mod check;
mod error;

use error::{DaemonError, Result};

/// Vertical-garden irrigation daemon.
#[derive(Debug, Parser)]
#[command(name = "verdant", version, about)]
struct Cli {
    /// Config file (TOML). Defaults to ./verdant.toml.
    #[arg(long, env = "VERDANT_CONFIG")]
    config: Option<String>,

    /// Never touch GPIO; log actuations instead.
    #[arg(long)]
    dry_run: bool,

    /// Load tasks, print each task's current decision as JSON, and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "verdant_daemon=info,verdant_scheduler=info,verdant_registry=info,\
                 verdant_actuator=info,verdant_activity=info"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.exit_code(), "fatal: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.check {
        let config = VerdantConfig::load(cli.config.as_deref())?;
        return check::run(&config, std::io::stdout().lock());
    }

    let config = VerdantConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        VerdantConfig::default()
    });

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    ensure_parent_dir(&config.activity.path);
    let activity: Arc<dyn ActivitySink> = Arc::new(FileActivityLog::open(&config.activity.path)?);
    let note = |message: String| activity.append(&ActivityRecord::info(None, clock.now(), message));
    note("Application started".to_string())?;

    let loaded = load_tasks(&config, activity.as_ref(), clock.as_ref())?;
    if loaded.tasks.is_empty() {
        note("No enabled tasks; exiting".to_string())?;
        return Err(DaemonError::NoTasks);
    }

    let actuator = build_actuator(&config, cli.dry_run)?;
    let shared = Shared {
        clock: Arc::clone(&clock),
        actuator,
        activity: Arc::clone(&activity),
    };
    let engine = SchedulerEngine::new(shared, config.scheduler.clone());

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown requested"),
            Err(e) => error!("signal handler failed: {e}"),
        }
        signal.cancel();
    });

    info!(tasks = loaded.tasks.len(), "starting scheduler");
    engine.run(loaded.tasks, shutdown).await?;

    note("Application stopped".to_string())?;
    Ok(())
}

/// Read the registry once, logging every skipped row to the audit trail.
fn load_tasks(
    config: &VerdantConfig,
    activity: &dyn ActivitySink,
    clock: &dyn Clock,
) -> Result<LoadedTasks> {
    let note = |record: ActivityRecord| activity.append(&record);

    note(ActivityRecord::info(
        None,
        clock.now(),
        "Task registry connection initiated",
    ))?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening task registry");

    let registry = match TaskRegistry::open(db_path) {
        Ok(r) => r,
        Err(e) => {
            note(ActivityRecord::error(
                None,
                clock.now(),
                format!("Task registry connect error: {e}"),
            ))?;
            return Err(e.into());
        }
    };
    let loaded = match registry.load_tasks(config.registry.max_tasks) {
        Ok(l) => l,
        Err(e) => {
            note(ActivityRecord::error(
                None,
                clock.now(),
                format!("Task registry query error: {e}"),
            ))?;
            return Err(e.into());
        }
    };

    for row in &loaded.rejected {
        let id = row.id.map_or_else(|| "?".to_string(), |id| id.to_string());
        note(ActivityRecord::warn(
            None,
            clock.now(),
            format!("registry row #,{id}, skipped: {}", row.reason),
        ))?;
    }
    for task in &loaded.tasks {
        note(ActivityRecord::info(None, clock.now(), format!("loaded {task}")))?;
    }
    note(ActivityRecord::info(
        None,
        clock.now(),
        "Task registry connection done",
    ))?;
    Ok(loaded)
}

fn build_actuator(config: &VerdantConfig, dry_run: bool) -> Result<Arc<dyn Actuator>> {
    if dry_run || config.actuator.mode == ActuatorMode::Log {
        info!("actuator: dry run (no GPIO)");
        return Ok(Arc::new(LogActuator));
    }
    let gpio = GpioActuator::new(&config.actuator.gpio_root, &config.actuator.pins)?;
    Ok(Arc::new(gpio))
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
