use std::sync::{Arc, Mutex, PoisonError};

use jiff::fmt::rfc2822::DateTimeParser;
use tracing::debug;

use crate::clock::Clock;

static HTTP_DATE: DateTimeParser = DateTimeParser::new();

/// A host cookie store with `document.cookie` semantics.
///
/// Reading returns every live cookie as a `name=value; name=value` header.
/// Writing takes a single `Set-Cookie` style directive.
pub trait CookieJar: Send + Sync {
    fn cookie_header(&self) -> String;
    fn set_cookie(&self, directive: &str);
}

#[derive(Clone, Debug)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    expires_at: Option<i64>,
}

impl StoredCookie {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory jar that applies `path`, `max-age` and `expires` the way a browser does.
///
/// Cookies keep insertion order. Overwriting a cookie with the same name and
/// path keeps its position.
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCookieJar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Number of cookies that have not expired yet.
    pub fn len(&self) -> usize {
        let now = self.clock.now_secs();
        self.lock().iter().filter(|cookie| cookie.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StoredCookie>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self) -> String {
        let now = self.clock.now_secs();
        let mut cookies = self.lock();
        cookies.retain(|cookie| cookie.is_live(now));
        cookies
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie(&self, directive: &str) {
        let mut parts = directive.split(';');
        let pair = parts.next().unwrap_or_default().trim();
        let Some((name, value)) = pair.split_once('=') else {
            debug!(directive, "ignoring cookie directive without name=value pair");
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            debug!(directive, "ignoring cookie directive with empty name");
            return;
        }

        let now = self.clock.now_secs();
        let mut path = "/";
        let mut max_age = None;
        let mut expires = None;
        for attr in parts {
            let attr = attr.trim();
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            match key.trim().to_ascii_lowercase().as_str() {
                "path" if !val.trim().is_empty() => path = val.trim(),
                "max-age" => max_age = val.trim().parse::<i64>().ok(),
                "expires" => match HTTP_DATE.parse_timestamp(val.trim()) {
                    Ok(at) => expires = Some(at.as_second()),
                    Err(err) => debug!(error = %err, "ignoring unparseable expires attribute"),
                },
                _ => {}
            }
        }
        // max-age takes precedence over expires
        let expires_at = match max_age {
            Some(age) => Some(now.saturating_add(age)),
            None => expires,
        };

        let mut cookies = self.lock();
        let existing = cookies
            .iter()
            .position(|cookie| cookie.name == name && cookie.path == path);
        if expires_at.is_some_and(|at| at <= now) {
            if let Some(index) = existing {
                cookies.remove(index);
            }
            return;
        }
        let cookie = StoredCookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            path: path.to_string(),
            expires_at,
        };
        match existing {
            Some(index) => cookies[index] = cookie,
            None => cookies.push(cookie),
        }
    }
}
