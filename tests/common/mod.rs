#![allow(dead_code)]

pub mod logs;
pub mod time;
pub mod tokens;

use std::sync::{Arc, Mutex};

use auth_cookie::{Clock, CookieConfig, CookieJar, ManualClock, MemoryCookieJar, TokenCookieStore};
use jiff::Timestamp;

pub const NOW: i64 = 1_760_000_000;

/// Memory jar that also keeps every directive written to it.
pub struct RecordingJar {
    inner: MemoryCookieJar,
    directives: Mutex<Vec<String>>,
}

impl RecordingJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: MemoryCookieJar::new(clock),
            directives: Mutex::new(Vec::new()),
        }
    }

    pub fn directives(&self) -> Vec<String> {
        self.directives.lock().unwrap().clone()
    }

    pub fn last_directive(&self) -> Option<String> {
        self.directives.lock().unwrap().last().cloned()
    }
}

impl CookieJar for RecordingJar {
    fn cookie_header(&self) -> String {
        self.inner.cookie_header()
    }

    fn set_cookie(&self, directive: &str) {
        self.directives.lock().unwrap().push(directive.to_string());
        self.inner.set_cookie(directive);
    }
}

pub struct Fixture {
    pub clock: ManualClock,
    pub jar: Arc<RecordingJar>,
    pub store: TokenCookieStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(CookieConfig::default())
    }

    pub fn with_config(config: CookieConfig) -> Self {
        let clock = ManualClock::new(Timestamp::from_second(NOW).expect("valid timestamp"));
        let jar = Arc::new(RecordingJar::new(Arc::new(clock.clone())));
        let store = TokenCookieStore::new(config, jar.clone(), Arc::new(clock.clone()));
        Self { clock, jar, store }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_secs()
    }
}
