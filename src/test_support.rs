//! Builders for unsigned JWT-shaped tokens used across the test modules.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};

use crate::types::Role;

pub(crate) fn unsigned_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) fn token_with_role(role: &str, ttl: Duration) -> String {
    let now = OffsetDateTime::now_utc();
    unsigned_token(&json!({
        "sub": "5b0c1c2e-busmate-user",
        "email": "user@busmate.lk",
        "user_role": role,
        "email_verified": true,
        "iat": now.unix_timestamp(),
        "exp": (now + ttl).unix_timestamp(),
    }))
}

pub(crate) fn token_expiring_in(role: Role, ttl: Duration) -> String {
    token_with_role(role.as_str(), ttl)
}
