use chrono::{DateTime, Duration, FixedOffset, Local};

/// Wall-clock source with the local UTC offset attached.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The host's real-time clock in the system time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Wall clock driven by tokio's time source from a fixed starting instant.
///
/// Follows `tokio::time::pause`/`advance`, which makes whole-day simulations
/// run instantly under `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin_wall: DateTime<FixedOffset>,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(origin_wall: DateTime<FixedOffset>) -> Self {
        Self {
            origin_wall,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let elapsed = tokio::time::Instant::now().duration_since(self.origin);
        self.origin_wall + Duration::from_std(elapsed).unwrap_or_else(|_| Duration::zero())
    }
}
