//! Keeps a bearer token in a cookie and watches it expire.
//!
//! [`TokenCookieStore`] writes, reads and clears the cookie, answers "is the
//! token still good" from the payload's `exp` claim, and can run a watch that
//! clears the cookie and calls back once the token has expired.
//!
//! The payload is decoded without checking the signature. Treat everything it
//! says as a client-side hint; never use it to grant access.

pub mod clock;
pub mod config;
pub mod errors;
pub mod jar;
pub mod scheduler;
mod store;
pub mod telemetry;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigLocation, CookieConfig, SameSite, read_config};
pub use errors::Error;
pub use jar::{CookieJar, MemoryCookieJar};
pub use scheduler::{Scheduler, TokioScheduler};
pub use store::TokenCookieStore;
pub use token::{
    ExpireCallback, ExpiryWatch, TokenClaims, WatchHandle, WatchOutcome, WatchPolicy, WatchState,
    WatchStep,
};
