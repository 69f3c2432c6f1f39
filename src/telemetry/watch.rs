use std::time::Duration;

use tracing::{Level, event};
use uuid::Uuid;

/// Structured events emitted over the life of one expiry watch.
#[derive(Clone, Debug)]
pub struct WatchTelemetry {
    watch_id: Uuid,
    context: String,
}

impl WatchTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            watch_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn watch_id(&self) -> Uuid {
        self.watch_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, remaining_secs: u64) {
        event!(
            Level::INFO,
            watch_id = %self.watch_id,
            context = %self.context,
            remaining_secs,
            "watch.start"
        );
    }

    pub fn emit_reschedule(&self, delay: Duration, remaining_secs: u64) {
        event!(
            Level::DEBUG,
            watch_id = %self.watch_id,
            context = %self.context,
            delay_secs = delay.as_secs(),
            remaining_secs,
            "watch.reschedule"
        );
    }

    pub fn emit_expired(&self, ticks: u32) {
        event!(
            Level::INFO,
            watch_id = %self.watch_id,
            context = %self.context,
            ticks,
            "watch.expired"
        );
    }

    pub fn emit_aborted(&self) {
        event!(
            Level::WARN,
            watch_id = %self.watch_id,
            context = %self.context,
            "watch.aborted"
        );
    }
}
