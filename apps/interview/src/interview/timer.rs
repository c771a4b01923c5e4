use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Recurring tick source for the active question.
#[derive(Debug, Clone, Copy)]
pub struct TickTimer {
    period: Duration,
}

/// Cancels the timer task when dropped.
#[derive(Debug)]
pub struct TickGuard {
    handle: JoinHandle<()>,
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TickTimer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Calls `on_tick` after `first_delay`, then once per period.
    /// Each callback runs on its own task, so dropping the guard mid-callback
    /// stops future ticks without interrupting the one in flight.
    pub fn start_after<F, Fut>(&self, first_delay: Duration, on_tick: F) -> TickGuard
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = self.period;
        let first_tick = Instant::now() + first_delay;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tokio::spawn(on_tick());
            }
        });
        TickGuard { handle }
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
