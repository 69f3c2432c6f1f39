use std::future::ready;
use std::sync::Mutex;
use std::time::Duration;

use auth_cookie::scheduler::SleepFuture;
use auth_cookie::{Clock, ManualClock, Scheduler};
use jiff::Timestamp;

/// Resolves every sleep immediately after moving the manual clock forward by the delay.
pub struct RecordingScheduler {
    clock: ManualClock,
    delays: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            delays: Mutex::new(Vec::new()),
        }
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().expect("delays poisoned").clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        self.delays.lock().expect("delays poisoned").push(delay);
        self.clock.advance(delay);
        Box::pin(ready(()))
    }
}

/// Wall clock pinned to the tokio timer, so paused runtimes move it too.
pub struct TokioClock {
    base: Timestamp,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: Timestamp) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        self.base
            .checked_add(self.origin.elapsed())
            .expect("tokio clock overflowed")
    }
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}
