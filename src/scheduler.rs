use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Fire-once delay used between expiry checks.
pub trait Scheduler: Send + Sync {
    fn sleep(&self, delay: Duration) -> SleepFuture;
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        Box::pin(tokio::time::sleep(delay))
    }
}
