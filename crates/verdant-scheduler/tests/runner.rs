// Drive full scheduler loops on tokio's paused clock: hours of simulated
// wall time run instantly and every timestamp is exact.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};
use tokio_util::sync::CancellationToken;
use verdant_activity::{ActivityError, ActivityRecord, ActivitySink, MemoryActivityLog};
use verdant_actuator::{Actuator, ActuatorError};
use verdant_core::config::SchedulerConfig;
use verdant_core::{Task, TaskId, TimeOfDay};
use verdant_scheduler::{Clock, SchedulerEngine, SchedulerError, Shared, TaskRunner, TokioClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    On,
    Off,
}

/// Records every engage/release with the wall time it happened at.
struct RecordingActuator {
    clock: Arc<dyn Clock>,
    events: Mutex<Vec<(TaskId, Edge, DateTime<FixedOffset>)>>,
    fail_engage: bool,
}

impl RecordingActuator {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            events: Mutex::new(Vec::new()),
            fail_engage: false,
        }
    }

    fn failing(clock: Arc<dyn Clock>) -> Self {
        Self {
            fail_engage: true,
            ..Self::new(clock)
        }
    }

    fn times(&self, edge: Edge) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _)| *e == edge)
            .map(|(_, _, at)| at.format("%d %H:%M:%S").to_string())
            .collect()
    }
}

impl Actuator for RecordingActuator {
    fn engage(&self, task: TaskId) -> verdant_actuator::Result<()> {
        if self.fail_engage {
            return Err(ActuatorError::UnmappedTask(task));
        }
        self.events
            .lock()
            .unwrap()
            .push((task, Edge::On, self.clock.now()));
        Ok(())
    }

    fn release(&self, task: TaskId) -> verdant_actuator::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((task, Edge::Off, self.clock.now()));
        Ok(())
    }
}

/// Sink that refuses records for one task, as if the log file vanished.
struct BrokenFor(TaskId);

impl ActivitySink for BrokenFor {
    fn append(&self, record: &ActivityRecord) -> verdant_activity::Result<()> {
        if record.task_id == Some(self.0) {
            return Err(ActivityError::Open {
                path: "log_file.csv".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        Ok(())
    }
}

fn wall(day: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 6, day, h, m, s)
        .unwrap()
}

fn task(id: u32, start: (u8, u8), end: (u8, u8), interval: u32, duration: u32) -> Task {
    Task::new(
        TaskId(id),
        TimeOfDay::new(start.0, start.1).unwrap(),
        TimeOfDay::new(end.0, end.1).unwrap(),
        interval,
        duration,
    )
    .unwrap()
}

struct Harness {
    clock: Arc<dyn Clock>,
    actuator: Arc<RecordingActuator>,
    activity: Arc<MemoryActivityLog>,
}

impl Harness {
    fn starting_at(start: DateTime<FixedOffset>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(start));
        Self {
            actuator: Arc::new(RecordingActuator::new(Arc::clone(&clock))),
            activity: Arc::new(MemoryActivityLog::new()),
            clock,
        }
    }

    fn shared(&self) -> Shared {
        Shared {
            clock: Arc::clone(&self.clock),
            actuator: self.actuator.clone(),
            activity: self.activity.clone(),
        }
    }

    fn messages(&self) -> Vec<String> {
        self.activity
            .records()
            .into_iter()
            .map(|r| r.message)
            .collect()
    }
}

async fn run_for(runner: TaskRunner, cancel: CancellationToken, secs: u64) -> verdant_scheduler::Result<()> {
    let handle = tokio::spawn(runner.run());
    tokio::time::sleep(Duration::from_secs(secs)).await;
    cancel.cancel();
    handle.await.expect("runner panicked")
}

#[tokio::test(start_paused = true)]
async fn daytime_window_fires_on_every_slot() {
    let h = Harness::starting_at(wall(1, 7, 59, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (8, 0), (10, 0), 30, 120), h.shared(), cancel.clone());

    run_for(runner, cancel, 3 * 3600).await.unwrap();

    assert_eq!(
        h.actuator.times(Edge::On),
        ["01 08:00:00", "01 08:30:00", "01 09:00:00", "01 09:30:00"]
    );
    assert_eq!(
        h.actuator.times(Edge::Off),
        ["01 08:02:00", "01 08:32:00", "01 09:02:00", "01 09:32:00"]
    );
}

#[tokio::test(start_paused = true)]
async fn post_fire_sleep_lands_on_next_slot() {
    let h = Harness::starting_at(wall(1, 8, 0, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (8, 0), (10, 0), 30, 120), h.shared(), cancel.clone());

    run_for(runner, cancel, 60 * 30 + 10).await.unwrap();

    let messages = h.messages();
    assert_eq!(messages[0], "task #,1, started");
    assert_eq!(messages[1], "task #,1, output on for ,120, sec");
    assert_eq!(messages[2], "task #,1, output off");
    assert_eq!(messages[3], "task #,1, going to sleep for ,1680, sec (,28, min)");
    assert_eq!(messages[4], "task #,1, woke up");

    let woke = h
        .activity
        .records()
        .into_iter()
        .find(|r| r.message.ends_with("woke up"))
        .unwrap();
    assert_eq!(woke.at, wall(1, 8, 30, 0));
}

#[tokio::test(start_paused = true)]
async fn mid_slot_start_waits_for_boundary() {
    let h = Harness::starting_at(wall(1, 8, 45, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (8, 0), (10, 0), 30, 120), h.shared(), cancel.clone());

    run_for(runner, cancel, 20 * 60).await.unwrap();

    assert_eq!(h.messages()[1], "task #,1, going to sleep for ,900, sec (,15, min)");
    assert_eq!(h.actuator.times(Edge::On), ["01 09:00:00"]);
}

#[tokio::test(start_paused = true)]
async fn overnight_window_fires_across_midnight() {
    let h = Harness::starting_at(wall(1, 22, 30, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (23, 0), (1, 0), 30, 10), h.shared(), cancel.clone());

    run_for(runner, cancel, 4 * 3600).await.unwrap();

    assert_eq!(
        h.actuator.times(Edge::On),
        ["01 23:00:00", "01 23:30:00", "02 00:00:00", "02 00:30:00"]
    );
}

#[tokio::test(start_paused = true)]
async fn outside_window_sleeps_until_it_opens() {
    let h = Harness::starting_at(wall(1, 10, 0, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (22, 0), (6, 0), 60, 300), h.shared(), cancel.clone());

    run_for(runner, cancel, 12 * 3600 + 5).await.unwrap();

    assert_eq!(h.messages()[1], "task #,1, going to sleep for ,43200, sec (,720, min)");
    assert_eq!(h.actuator.times(Edge::On), ["01 22:00:00"]);
}

#[tokio::test(start_paused = true)]
async fn all_day_window_keeps_cadence_through_midnight() {
    let h = Harness::starting_at(wall(1, 23, 10, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (6, 0), (6, 0), 20, 5), h.shared(), cancel.clone());

    run_for(runner, cancel, 3600).await.unwrap();

    assert_eq!(
        h.actuator.times(Edge::On),
        ["01 23:20:00", "01 23:40:00", "02 00:00:00"]
    );
    assert_eq!(h.messages()[1], "task #,1, going to sleep for ,600, sec (,10, min)");
}

#[tokio::test(start_paused = true)]
async fn several_days_never_double_fire() {
    let h = Harness::starting_at(wall(1, 0, 0, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (6, 0), (7, 0), 30, 60), h.shared(), cancel.clone());

    run_for(runner, cancel, 3 * 86_400).await.unwrap();

    assert_eq!(
        h.actuator.times(Edge::On),
        [
            "01 06:00:00",
            "01 06:30:00",
            "02 06:00:00",
            "02 06:30:00",
            "03 06:00:00",
            "03 06:30:00"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_during_hold_still_releases() {
    let h = Harness::starting_at(wall(1, 8, 0, 0));
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (8, 0), (10, 0), 30, 120), h.shared(), cancel.clone());

    run_for(runner, cancel, 30).await.unwrap();

    assert_eq!(h.actuator.times(Edge::On), ["01 08:00:00"]);
    assert_eq!(h.actuator.times(Edge::Off), ["01 08:00:30"]);
    assert_eq!(h.messages().last().unwrap(), "task #,1, stopped");
}

#[tokio::test(start_paused = true)]
async fn engage_failure_is_logged_and_loop_continues() {
    let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(wall(1, 8, 0, 0)));
    let actuator = Arc::new(RecordingActuator::failing(Arc::clone(&clock)));
    let activity = Arc::new(MemoryActivityLog::new());
    let shared = Shared {
        clock,
        actuator: actuator.clone(),
        activity: activity.clone(),
    };
    let cancel = CancellationToken::new();
    let runner = TaskRunner::new(task(1, (8, 0), (10, 0), 30, 120), shared, cancel.clone());

    run_for(runner, cancel, 3600 + 5).await.unwrap();

    let failures = activity
        .records()
        .iter()
        .filter(|r| r.message.contains("engage failed"))
        .count();
    assert_eq!(failures, 3);
    // Release is still attempted after every failed engage.
    assert_eq!(actuator.times(Edge::Off).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn activity_failure_stops_the_whole_fleet() {
    let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(wall(1, 7, 0, 0)));
    let shared = Shared {
        actuator: Arc::new(RecordingActuator::new(Arc::clone(&clock))),
        activity: Arc::new(BrokenFor(TaskId(2))),
        clock,
    };
    let engine = SchedulerEngine::new(shared, SchedulerConfig::default());
    let tasks = vec![
        task(1, (8, 0), (10, 0), 30, 120),
        task(2, (8, 0), (10, 0), 30, 120),
    ];

    let shutdown = CancellationToken::new();
    let result = engine.run(tasks, shutdown.clone()).await;

    assert!(matches!(result, Err(SchedulerError::Activity(_))));
    // The daemon's own token is left for the caller to manage.
    assert!(!shutdown.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn engine_runs_tasks_independently_until_shutdown() {
    let h = Harness::starting_at(wall(1, 7, 59, 0));
    let engine = SchedulerEngine::new(h.shared(), SchedulerConfig::default());
    let tasks = vec![
        task(1, (8, 0), (9, 0), 30, 60),
        task(2, (8, 15), (9, 0), 15, 30),
    ];

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(engine.run(tasks, shutdown.clone()));
    tokio::time::sleep(Duration::from_secs(3600)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let events = h.actuator.events.lock().unwrap().clone();
    let on = |id: u32| -> Vec<String> {
        events
            .iter()
            .filter(|(t, e, _)| *t == TaskId(id) && *e == Edge::On)
            .map(|(_, _, at)| at.format("%H:%M").to_string())
            .collect()
    };
    assert_eq!(on(1), ["08:00", "08:30"]);
    assert_eq!(on(2), ["08:15", "08:30", "08:45"]);

    let stopped = h
        .messages()
        .iter()
        .filter(|m| m.ends_with("stopped"))
        .count();
    assert_eq!(stopped, 2);
}

#[tokio::test(start_paused = true)]
async fn large_sleep_floor_keeps_short_sleeps_on_slot() {
    // One-minute slots held for 58 s leave a 2 s post-fire sleep, far below
    // the floor; it must still land on every slot boundary.
    let h = Harness::starting_at(wall(1, 7, 59, 30));
    let engine = SchedulerEngine::new(h.shared(), SchedulerConfig { min_sleep_secs: 60 });
    let tasks = vec![task(1, (8, 0), (9, 0), 1, 58)];

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(engine.run(tasks, shutdown.clone()));
    tokio::time::sleep(Duration::from_secs(6 * 60)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    assert_eq!(
        h.actuator.times(Edge::On),
        [
            "01 08:00:00",
            "01 08:01:00",
            "01 08:02:00",
            "01 08:03:00",
            "01 08:04:00",
            "01 08:05:00"
        ]
    );
    let messages = h.messages();
    assert_eq!(messages[1], "task #,1, going to sleep for ,30, sec (,0, min)");
    assert!(messages.contains(&"task #,1, going to sleep for ,2, sec (,0, min)".to_string()));
}
