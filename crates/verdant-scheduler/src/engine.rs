use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use verdant_activity::{ActivityRecord, ActivitySink, Severity};
use verdant_actuator::Actuator;
use verdant_core::config::{SchedulerConfig, DEFAULT_MIN_SLEEP_SECS};
use verdant_core::{Task, TaskId};

use crate::clock::Clock;
use crate::error::{Result, SchedulerError};
use crate::schedule::resolve;

/// Collaborators shared by every worker.
#[derive(Clone)]
pub struct Shared {
    pub clock: Arc<dyn Clock>,
    pub actuator: Arc<dyn Actuator>,
    pub activity: Arc<dyn ActivitySink>,
}

/// Per-task scheduling loop: evaluate → (actuate) → sleep, forever or until
/// its cancellation token fires.
pub struct TaskRunner {
    task: Task,
    shared: Shared,
    cancel: CancellationToken,
    min_sleep_secs: i64,
}

impl TaskRunner {
    pub fn new(task: Task, shared: Shared, cancel: CancellationToken) -> Self {
        Self {
            task,
            shared,
            cancel,
            min_sleep_secs: DEFAULT_MIN_SLEEP_SECS as i64,
        }
    }

    pub fn with_min_sleep(mut self, secs: u64) -> Self {
        self.min_sleep_secs = i64::try_from(secs.max(1)).unwrap_or(i64::MAX);
        self
    }

    pub fn task_id(&self) -> TaskId {
        self.task.id()
    }

    /// Run until cancelled. Only an activity-log failure ends the loop early.
    pub async fn run(self) -> Result<()> {
        let id = self.task.id();
        info!(task_id = %id, "{} started", self.task);
        self.record(Severity::Info, format!("task #,{id}, started"))?;

        while !self.cancel.is_cancelled() {
            // Evaluating
            let now = self.shared.clock.now();
            let now_secs = now.timestamp();
            let decision = resolve(&self.task, &now);
            debug!(task_id = %id, ?decision, "scheduling decision");

            // Acting
            let mut held = 0;
            if decision.is_fire() {
                if !self.actuate().await? {
                    break;
                }
                held = self.task.duration_secs();
            }

            // Sleeping
            let sleep_secs = self.clamp(decision.sleep_secs());
            self.record(
                Severity::Info,
                format!(
                    "task #,{id}, going to sleep for ,{sleep_secs}, sec (,{}, min)",
                    sleep_secs / 60
                ),
            )?;
            if !self.sleep_until(now_secs + held + sleep_secs).await {
                break;
            }
            self.record(Severity::Info, format!("task #,{id}, woke up"))?;
        }

        info!(task_id = %id, "task stopped");
        self.record(Severity::Info, format!("task #,{id}, stopped"))?;
        Ok(())
    }

    /// Engage, hold for the task duration, release. Returns `false` when the
    /// hold was cut short by cancellation; the output is released either way.
    async fn actuate(&self) -> Result<bool> {
        let id = self.task.id();
        let duration = self.task.duration_seconds();
        self.record(
            Severity::Info,
            format!("task #,{id}, output on for ,{duration}, sec"),
        )?;

        let completed = match self.shared.actuator.engage(id) {
            Ok(()) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(u64::from(duration))) => true,
                    _ = self.cancel.cancelled() => false,
                }
            }
            Err(e) => {
                error!(task_id = %id, "engage failed: {e}");
                self.record(Severity::Error, format!("task #,{id}, engage failed: {e}"))?;
                true
            }
        };

        match self.shared.actuator.release(id) {
            Ok(()) => self.record(Severity::Info, format!("task #,{id}, output off"))?,
            Err(e) => {
                error!(task_id = %id, "release failed: {e}");
                self.record(Severity::Error, format!("task #,{id}, release failed: {e}"))?;
            }
        }
        Ok(completed)
    }

    /// Sleep until the whole epoch second `deadline`, measured against the
    /// clock so sub-second latency does not accumulate. Returns `false` if
    /// cancelled first.
    async fn sleep_until(&self, deadline: i64) -> bool {
        let remaining_ms = deadline
            .saturating_mul(1000)
            .saturating_sub(self.shared.clock.now().timestamp_millis());
        let pause = Duration::from_millis(u64::try_from(remaining_ms).unwrap_or(0));

        tokio::select! {
            _ = tokio::time::sleep(pause) => !self.cancel.is_cancelled(),
            _ = self.cancel.cancelled() => false,
        }
    }

    /// Replace a degenerate (zero or negative) sleep with the configured
    /// floor. Positive sleeps pass through untouched, however short.
    fn clamp(&self, sleep_secs: i64) -> i64 {
        if sleep_secs <= 0 {
            warn!(
                task_id = %self.task.id(),
                sleep_secs,
                min = self.min_sleep_secs,
                "degenerate sleep clamped"
            );
            self.min_sleep_secs
        } else {
            sleep_secs
        }
    }

    fn record(&self, severity: Severity, message: String) -> Result<()> {
        let record = ActivityRecord::new(
            Some(self.task.id()),
            severity,
            self.shared.clock.now(),
            message,
        );
        self.shared.activity.append(&record)?;
        Ok(())
    }
}

/// Owns the fleet of task workers.
///
/// One tokio task per [`Task`]; workers share nothing but the collaborators
/// in [`Shared`]. The first fatal worker error cancels the rest.
pub struct SchedulerEngine {
    shared: Shared,
    config: SchedulerConfig,
}

impl SchedulerEngine {
    pub fn new(shared: Shared, config: SchedulerConfig) -> Self {
        Self { shared, config }
    }

    /// Build the runner for one task with a token derived from `parent`.
    pub fn runner(&self, task: Task, parent: &CancellationToken) -> TaskRunner {
        TaskRunner::new(task, self.shared.clone(), parent.child_token())
            .with_min_sleep(self.config.min_sleep_secs)
    }

    /// Run every task until `shutdown` is cancelled or a worker fails.
    pub async fn run(self, tasks: Vec<Task>, shutdown: CancellationToken) -> Result<()> {
        let fleet = shutdown.child_token();
        let mut workers = JoinSet::new();

        for task in tasks {
            let runner = self.runner(task, &fleet);
            let id = runner.task_id();
            workers.spawn(async move { (id, runner.run().await) });
            debug!(task_id = %id, "worker spawned");
        }
        info!(workers = workers.len(), "scheduler engine started");

        let mut failure: Option<SchedulerError> = None;
        while let Some(joined) = workers.join_next().await {
            let err = match joined {
                Ok((_, Ok(()))) => continue,
                Ok((id, Err(e))) => {
                    error!(task_id = %id, "worker failed: {e}");
                    e
                }
                Err(e) => {
                    error!("worker join failed: {e}");
                    SchedulerError::Join(e.to_string())
                }
            };
            if failure.is_none() {
                fleet.cancel();
                failure = Some(err);
            }
        }

        info!("scheduler engine stopped");
        failure.map_or(Ok(()), Err)
    }
}
