use std::time::Duration;

use crate::errors::Error;

/// What the expiry watch should do after checking the remaining lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchStep {
    Expired,
    Recheck(Duration),
}

/// Timing rules for the expiry watch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchPolicy {
    /// Longest gap between two checks while the token is comfortably alive.
    pub poll_interval: Duration,
    /// Remaining lifetime below which the watch switches to fast polling.
    pub lead_time: Duration,
    /// Gap between checks once the lead time has been reached.
    pub fast_poll: Duration,
}

impl WatchPolicy {
    pub fn new(
        poll_interval: Duration,
        lead_time: Duration,
        fast_poll: Duration,
    ) -> Result<Self, Error> {
        if poll_interval < Duration::from_secs(1) {
            return Err(Error::Config("Poll interval must be at least one second".into()));
        }
        if fast_poll < Duration::from_secs(1) {
            return Err(Error::Config("Fast poll interval must be at least one second".into()));
        }
        Ok(Self {
            poll_interval,
            lead_time,
            fast_poll,
        })
    }

    /// Decides the next step from the remaining lifetime in whole seconds.
    ///
    /// The next check lands at the lesser of the poll interval and the time left
    /// before the lead window opens. Inside the lead window checks fall back to
    /// the fast poll interval.
    pub fn next_step(&self, remaining_secs: u64) -> WatchStep {
        if remaining_secs == 0 {
            return WatchStep::Expired;
        }
        let until_lead = remaining_secs as i128 - self.lead_time.as_secs() as i128;
        let next = until_lead.min(self.poll_interval.as_secs() as i128);
        if next > 0 {
            WatchStep::Recheck(Duration::from_secs(next as u64))
        } else {
            WatchStep::Recheck(self.fast_poll)
        }
    }
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            lead_time: Duration::from_secs(30),
            fast_poll: Duration::from_secs(5),
        }
    }
}
