use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

use crate::errors::Error;

/// Unverified payload of a compact `header.payload.signature` token.
///
/// Nothing here checks the header or the signature. The payload is only good
/// for client-side hints such as "when should the UI consider this session
/// over"; it must never back an authorization decision.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims {
    exp: Option<i64>,
    payload: Map<String, Value>,
}

impl TokenClaims {
    /// Decodes the middle segment of `token` as base64 JSON.
    pub fn decode(token: &str) -> Result<Self, Error> {
        let segment = token
            .split('.')
            .nth(1)
            .ok_or_else(|| Error::MalformedToken("missing payload segment".into()))?;
        let bytes = decode_segment(segment)?;
        let payload: Map<String, Value> = serde_json::from_slice(&bytes)?;
        let exp = payload.get("exp").and_then(epoch_seconds);
        Ok(Self { exp, payload })
    }

    /// The `exp` claim in seconds since the epoch, if present and numeric.
    pub fn exp(&self) -> Option<i64> {
        self.exp
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// True while `now` is strictly before `exp`. A missing `exp` never counts as live.
    pub fn is_live(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp > now)
    }

    /// Seconds until expiry, clamped at zero.
    pub fn remaining(&self, now: i64) -> u64 {
        match self.exp {
            Some(exp) if exp > now => exp.abs_diff(now),
            _ => 0,
        }
    }
}

// Padding is optional and either alphabet is accepted, so both classic base64
// and the url-safe flavour used by JWTs decode.
fn decode_segment(segment: &str) -> Result<Vec<u8>, Error> {
    let trimmed = segment.trim_end_matches('=');
    let bytes = if trimmed.contains(['-', '_']) {
        URL_SAFE_NO_PAD.decode(trimmed)?
    } else {
        STANDARD_NO_PAD.decode(trimmed)?
    };
    Ok(bytes)
}

fn epoch_seconds(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|secs| secs.floor() as i64))
}
