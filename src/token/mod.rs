mod claims;
mod policy;
mod watch;

pub use claims::TokenClaims;
pub use policy::{WatchPolicy, WatchStep};
pub use watch::{ExpireCallback, ExpiryWatch, WatchHandle, WatchOutcome, WatchState};
