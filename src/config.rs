//! cookie attributes and where to read them from

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::errors::Error;
use crate::token::WatchPolicy;

pub const DEFAULT_COOKIE_NAME: &str = "auth_token";
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(86_400);

const CLEAR_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Lax => "lax",
            SameSite::Strict => "strict",
            SameSite::None => "none",
        })
    }
}

impl FromStr for SameSite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            other => Err(Error::Config(format!(
                "Unknown same-site policy '{}'; expected 'lax', 'strict' or 'none'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SameSite {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Name and attributes of the token cookie. Fixed once a store is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            secure: false,
            same_site: SameSite::Lax,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl CookieConfig {
    /// Default attributes, marked `secure` when the page is served over https.
    pub fn for_page_url(page_url: &str) -> Result<Self, Error> {
        let url = Url::parse(page_url)?;
        Ok(Self::default().with_secure(url.scheme() == "https"))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Browsers drop `samesite=none` cookies that are not `secure`.
    pub fn effective_secure(&self) -> bool {
        self.secure || self.same_site == SameSite::None
    }

    /// `name=<token>; path=/; [secure; ]samesite=lax; max-age=86400`
    pub fn set_directive(&self, token: &str) -> String {
        let mut directive = format!("{}={}; path={}", self.name, token, self.path);
        if self.effective_secure() {
            directive.push_str("; secure");
        }
        directive.push_str(&format!(
            "; samesite={}; max-age={}",
            self.same_site,
            self.max_age.as_secs()
        ));
        directive
    }

    /// `name=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/`
    pub fn clear_directive(&self) -> String {
        format!("{}=; expires={}; path={}", self.name, CLEAR_EXPIRES, self.path)
    }
}

pub enum ConfigLocation {
    File(String),
    Env,
    Default,
}

/// Raw settings as read from a file or the environment. Unset fields use defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cookie_name: Option<String>,
    pub path: Option<String>,
    pub secure: Option<bool>,
    pub page_url: Option<String>,
    pub same_site: Option<SameSite>,
    pub max_age_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub lead_time_secs: Option<u64>,
    pub fast_poll_secs: Option<u64>,
}

impl Config {
    /// Builds cookie attributes. An explicit `secure` wins over one derived from `page_url`.
    pub fn cookie_config(&self) -> Result<CookieConfig, Error> {
        let mut cookie = match &self.page_url {
            Some(page_url) => CookieConfig::for_page_url(page_url)?,
            None => CookieConfig::default(),
        };
        if let Some(name) = &self.cookie_name {
            if name.is_empty() || name.contains(['=', ';']) {
                return Err(Error::Config(format!("Invalid cookie name '{}'", name)));
            }
            cookie.name = name.clone();
        }
        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(Error::Config(format!("Cookie path '{}' must start with '/'", path)));
            }
            cookie.path = path.clone();
        }
        if let Some(secure) = self.secure {
            cookie.secure = secure;
        }
        if let Some(same_site) = self.same_site {
            cookie.same_site = same_site;
        }
        if let Some(max_age) = self.max_age_secs {
            cookie.max_age = Duration::from_secs(max_age);
        }
        Ok(cookie)
    }

    pub fn watch_policy(&self) -> Result<WatchPolicy, Error> {
        let defaults = WatchPolicy::default();
        WatchPolicy::new(
            self.poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            self.lead_time_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.lead_time),
            self.fast_poll_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.fast_poll),
        )
    }
}

pub fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    let config = match loc {
        ConfigLocation::File(path) => {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        }
        ConfigLocation::Env => config_from_lookup(|key| std::env::var(key).ok())?,
        ConfigLocation::Default => Config::default(),
    };
    Ok(config)
}

fn config_from_lookup<F>(lookup: F) -> Result<Config, Error>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(Config {
        cookie_name: lookup("AUTH_COOKIE_NAME"),
        path: lookup("AUTH_COOKIE_PATH"),
        secure: parse_var(&lookup, "AUTH_COOKIE_SECURE")?,
        page_url: lookup("AUTH_COOKIE_PAGE_URL"),
        same_site: parse_var(&lookup, "AUTH_COOKIE_SAMESITE")?,
        max_age_secs: parse_var(&lookup, "AUTH_COOKIE_MAX_AGE")?,
        poll_interval_secs: parse_var(&lookup, "AUTH_COOKIE_POLL_SECS")?,
        lead_time_secs: parse_var(&lookup, "AUTH_COOKIE_LEAD_SECS")?,
        fast_poll_secs: parse_var(&lookup, "AUTH_COOKIE_FAST_POLL_SECS")?,
    })
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| Error::Config(format!("Invalid value '{}' for {} env var", raw, key)))
        })
        .transpose()
}
