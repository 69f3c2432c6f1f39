use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{Config, CookieConfig};
use crate::errors::Error;
use crate::jar::CookieJar;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::token::{ExpireCallback, ExpiryWatch, TokenClaims, WatchHandle, WatchPolicy, WatchState};

/// Keeps an authentication token in a cookie and tracks its expiry.
///
/// The store holds no state of its own; every call goes back to the jar.
/// Expiry comes from the token's unverified `exp` claim, so the answers here
/// are hints for the UI, not proof that the server will accept the token.
#[derive(Clone)]
pub struct TokenCookieStore {
    config: CookieConfig,
    policy: WatchPolicy,
    jar: Arc<dyn CookieJar>,
    clock: Arc<dyn Clock>,
}

impl TokenCookieStore {
    pub fn new(config: CookieConfig, jar: Arc<dyn CookieJar>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            policy: WatchPolicy::default(),
            jar,
            clock,
        }
    }

    pub fn from_config(
        config: &Config,
        jar: Arc<dyn CookieJar>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        Ok(Self::new(config.cookie_config()?, jar, clock).with_policy(config.watch_policy()?))
    }

    pub fn with_policy(mut self, policy: WatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn policy(&self) -> &WatchPolicy {
        &self.policy
    }

    /// Stores `token` in the cookie. The token is not inspected.
    pub fn write(&self, token: &str) {
        self.jar.set_cookie(&self.config.set_directive(token));
        debug!(cookie = %self.config.name, "auth cookie set");
    }

    /// Returns the value of the first cookie named like ours, in jar order.
    pub fn read(&self) -> Option<String> {
        let header = self.jar.cookie_header();
        for entry in header.split(';') {
            let entry = entry.trim();
            match entry.split_once('=') {
                Some((name, value)) if name == self.config.name => return Some(value.to_string()),
                None if entry == self.config.name => return None,
                _ => {}
            }
        }
        None
    }

    pub fn clear(&self) {
        self.jar.set_cookie(&self.config.clear_directive());
        debug!(cookie = %self.config.name, "auth cookie cleared");
    }

    /// True while the stored token's `exp` is strictly in the future.
    pub fn is_valid(&self) -> bool {
        let now = self.clock.now_secs();
        self.claims().is_some_and(|claims| claims.is_live(now))
    }

    /// Seconds until the stored token expires; zero when absent, unreadable or expired.
    pub fn remaining_seconds(&self) -> u64 {
        let now = self.clock.now_secs();
        self.claims().map_or(0, |claims| claims.remaining(now))
    }

    /// Starts watching the token on the tokio timer.
    ///
    /// See [`TokenCookieStore::watch_expiry_with`].
    pub fn watch_expiry(&self, on_expire: Option<ExpireCallback>) -> WatchHandle {
        self.watch_expiry_with(Arc::new(TokioScheduler), on_expire)
    }

    /// Starts watching the token, sleeping on `scheduler` between checks.
    ///
    /// The first check runs before this returns: an already expired token is
    /// cleared and `on_expire` called synchronously, and no task is spawned.
    /// Otherwise the remaining checks run on a spawned tokio task, so this must
    /// be called from within a runtime.
    pub fn watch_expiry_with(
        &self,
        scheduler: Arc<dyn Scheduler>,
        on_expire: Option<ExpireCallback>,
    ) -> WatchHandle {
        let mut watch = ExpiryWatch::new(self.clone(), on_expire);
        let telemetry = watch.telemetry().clone();
        match watch.tick() {
            WatchState::Scheduled(_) => {
                let task = tokio::spawn(async move { watch.run(scheduler.as_ref()).await });
                WatchHandle::running(telemetry, task)
            }
            _ => WatchHandle::finished(telemetry, watch.outcome()),
        }
    }

    fn claims(&self) -> Option<TokenClaims> {
        let token = self.read().filter(|token| !token.is_empty())?;
        match TokenClaims::decode(&token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                warn!(cookie = %self.config.name, error = %err, "stored token could not be decoded");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jiff::Timestamp;

    use super::*;
    use crate::clock::ManualClock;
    use crate::jar::MemoryCookieJar;

    const NOW: i64 = 1_700_000_000;

    fn store() -> (Arc<MemoryCookieJar>, TokenCookieStore) {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Timestamp::from_second(NOW).unwrap()));
        let jar = Arc::new(MemoryCookieJar::new(clock.clone()));
        let store = TokenCookieStore::new(CookieConfig::default(), jar.clone(), clock);
        (jar, store)
    }

    fn token(exp: i64) -> String {
        format!("hdr.{}.sig", URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#)))
    }

    #[test]
    fn first_matching_cookie_wins() {
        let (jar, store) = store();
        jar.set_cookie("auth_token=first; path=/");
        jar.set_cookie("auth_token=second; path=/nested");
        assert_eq!(store.read().as_deref(), Some("first"));
    }

    #[test]
    fn read_splits_on_first_equals_only() {
        let (jar, store) = store();
        jar.set_cookie("auth_token=abc==.def=; path=/");
        assert_eq!(store.read().as_deref(), Some("abc==.def="));
    }

    #[test]
    fn similarly_named_cookies_do_not_match() {
        let (jar, store) = store();
        jar.set_cookie("auth_token_old=stale");
        jar.set_cookie("xauth_token=other");
        assert_eq!(store.read(), None);
    }

    #[test]
    fn empty_cookie_value_is_not_a_token() {
        let (jar, store) = store();
        jar.set_cookie("auth_token=; path=/");
        assert_eq!(store.read().as_deref(), Some(""));
        assert!(!store.is_valid());
        assert_eq!(store.remaining_seconds(), 0);
    }

    #[test]
    fn validity_and_remaining_follow_exp() {
        let (_, store) = store();
        store.write(&token(NOW + 90));
        assert!(store.is_valid());
        assert_eq!(store.remaining_seconds(), 90);

        store.write(&token(NOW));
        assert!(!store.is_valid());
        assert_eq!(store.remaining_seconds(), 0);
    }

    #[test]
    fn policy_comes_from_config() {
        let (jar, _) = store();
        let config = Config {
            fast_poll_secs: Some(1),
            ..Config::default()
        };
        let clock = Arc::new(ManualClock::default());
        let store = TokenCookieStore::from_config(&config, jar, clock).unwrap();
        assert_eq!(store.policy().fast_poll, std::time::Duration::from_secs(1));
    }
}
