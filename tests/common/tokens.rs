use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{EncodingKey, Header};

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// HS256 token whose payload carries `exp`.
pub fn signed_token(exp: i64) -> String {
    let claims = Claims {
        sub: "user-42".into(),
        exp,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"cookie-test-secret"),
    )
    .expect("signing should succeed")
}

/// Token with an arbitrary payload segment, encoded as-is.
pub fn token_with_payload(payload: &str) -> String {
    format!("eyJhbGciOiJub25lIn0.{}.", URL_SAFE_NO_PAD.encode(payload))
}
