use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::errors::Error;
use crate::scheduler::Scheduler;
use crate::store::TokenCookieStore;
use crate::telemetry::watch::WatchTelemetry;

use super::WatchStep;

/// Called once when the watch finds the token expired.
pub type ExpireCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Scheduled(Duration),
    Stopped,
}

/// Summary of a finished watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchOutcome {
    pub ticks: u32,
}

/// Expiry watch as an explicit state machine.
///
/// `tick` performs one check and never sleeps; `run` drives ticks through a
/// [`Scheduler`] until the token expires.
pub struct ExpiryWatch {
    store: TokenCookieStore,
    on_expire: Option<ExpireCallback>,
    state: WatchState,
    ticks: u32,
    telemetry: WatchTelemetry,
}

impl ExpiryWatch {
    pub fn new(store: TokenCookieStore, on_expire: Option<ExpireCallback>) -> Self {
        let telemetry = WatchTelemetry::new(store.config().name.clone());
        Self {
            store,
            on_expire,
            state: WatchState::Idle,
            ticks: 0,
            telemetry,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn telemetry(&self) -> &WatchTelemetry {
        &self.telemetry
    }

    pub fn outcome(&self) -> WatchOutcome {
        WatchOutcome { ticks: self.ticks }
    }

    /// Checks the token once and moves to `Scheduled` or `Stopped`.
    ///
    /// On expiry the cookie is cleared before the callback runs. Ticking a
    /// stopped watch does nothing.
    pub fn tick(&mut self) -> WatchState {
        if self.state == WatchState::Stopped {
            return self.state;
        }
        let remaining = self.store.remaining_seconds();
        if self.state == WatchState::Idle {
            self.telemetry.emit_start(remaining);
        }
        self.ticks += 1;

        self.state = match self.store.policy().next_step(remaining) {
            WatchStep::Expired => {
                self.store.clear();
                self.telemetry.emit_expired(self.ticks);
                if let Some(on_expire) = self.on_expire.take() {
                    on_expire();
                }
                WatchState::Stopped
            }
            WatchStep::Recheck(delay) => {
                self.telemetry.emit_reschedule(delay, remaining);
                WatchState::Scheduled(delay)
            }
        };
        self.state
    }

    /// Runs ticks until the token expires, sleeping on `scheduler` in between.
    pub async fn run(mut self, scheduler: &dyn Scheduler) -> WatchOutcome {
        loop {
            match self.state {
                WatchState::Idle => {
                    self.tick();
                }
                WatchState::Scheduled(delay) => {
                    scheduler.sleep(delay).await;
                    self.tick();
                }
                WatchState::Stopped => return self.outcome(),
            }
        }
    }
}

enum HandleState {
    Finished(WatchOutcome),
    Running(JoinHandle<WatchOutcome>),
}

/// Handle to a watch started by [`TokenCookieStore::watch_expiry`].
///
/// Dropping the handle leaves the watch running.
pub struct WatchHandle {
    telemetry: WatchTelemetry,
    state: HandleState,
}

impl WatchHandle {
    pub(crate) fn finished(telemetry: WatchTelemetry, outcome: WatchOutcome) -> Self {
        Self {
            telemetry,
            state: HandleState::Finished(outcome),
        }
    }

    pub(crate) fn running(telemetry: WatchTelemetry, task: JoinHandle<WatchOutcome>) -> Self {
        Self {
            telemetry,
            state: HandleState::Running(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.telemetry.watch_id()
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Finished(_) => true,
            HandleState::Running(task) => task.is_finished(),
        }
    }

    /// Stops the watch before it detects expiry. The callback will not run.
    pub fn abort(&self) {
        match &self.state {
            HandleState::Running(task) if !task.is_finished() => {
                task.abort();
                self.telemetry.emit_aborted();
            }
            _ => debug!(watch_id = %self.id(), "abort on finished watch ignored"),
        }
    }

    /// Waits for the watch to finish. Fails if the watch was aborted.
    pub async fn join(self) -> Result<WatchOutcome, Error> {
        match self.state {
            HandleState::Finished(outcome) => Ok(outcome),
            HandleState::Running(task) => Ok(task.await?),
        }
    }
}
