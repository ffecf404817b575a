use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::TokenError;
use crate::types::{AccessToken, Role, SubjectId};

/// Claims decoded from a credential's payload segment.
///
/// These are **unverified**. Nothing in this crate checks the signature, so
/// the claims drive UI gating only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct IdentityClaims {
    pub sub: SubjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Standard `role` claim. Some providers put a generic value here
    /// (e.g. `authenticated`) and the application role in `user_role`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(
        default,
        with = "time::serde::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<OffsetDateTime>,
    #[serde(with = "time::serde::timestamp")]
    pub exp: OffsetDateTime,
}

impl IdentityClaims {
    /// The application role, preferring `user_role` over `role`.
    ///
    /// Returns `None` when neither claim holds a recognised tag.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        [self.user_role.as_deref(), self.role.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|tag| tag.parse().ok())
    }

    /// Expired once `now` reaches `exp + leeway`. An `exp` so far out that
    /// adding the leeway leaves the representable range never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
        match self.exp.checked_add(leeway) {
            Some(limit) => now >= limit,
            None => leeway.is_negative(),
        }
    }
}

/// Decodes the claims of a `header.payload.signature` token without
/// verifying the signature.
///
/// # Errors
///
/// Returns [`TokenError`] if the token doesn't have three segments, the
/// payload isn't base64url, or the JSON lacks `sub`/`exp`.
pub fn decode_claims(token: &str) -> Result<IdentityClaims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(segments.len()));
    }

    // Padding is optional in the wild.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Encoding)?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))
}

/// A bearer token together with its decoded claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: AccessToken,
    claims: IdentityClaims,
}

impl Credential {
    /// # Errors
    ///
    /// Returns [`TokenError`] if the claims can't be decoded.
    pub fn from_token(token: impl Into<String>) -> Result<Self, TokenError> {
        let token: String = token.into();
        let token = token.trim().to_owned();
        let claims = decode_claims(&token)?;
        Ok(Self {
            token: AccessToken::from(token),
            claims,
        })
    }

    #[must_use]
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    #[must_use]
    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.claims.role()
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.claims.exp
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
        self.claims.is_expired_at(now, leeway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{token_expiring_in, unsigned_token};
    use serde_json::json;

    #[test]
    fn decodes_full_claims() {
        let token = unsigned_token(&json!({
            "sub": "user-1",
            "email": "ops@busmate.lk",
            "user_role": "mot-admin",
            "email_verified": true,
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, SubjectId("user-1".into()));
        assert_eq!(claims.email.as_deref(), Some("ops@busmate.lk"));
        assert_eq!(claims.role(), Some(Role::MotOfficial));
        assert_eq!(claims.email_verified, Some(true));
        assert_eq!(claims.iat.unwrap().unix_timestamp(), 1_700_000_000);
        assert_eq!(claims.exp.unix_timestamp(), 1_700_003_600);
    }

    #[test]
    fn user_role_takes_precedence_over_generic_role() {
        let token = unsigned_token(&json!({
            "sub": "u",
            "role": "authenticated",
            "user_role": "admin",
            "exp": 1_700_000_000,
        }));
        assert_eq!(decode_claims(&token).unwrap().role(), Some(Role::Admin));
    }

    #[test]
    fn falls_back_to_role_claim() {
        let token = unsigned_token(&json!({"sub": "u", "role": "operator", "exp": 1}));
        assert_eq!(
            decode_claims(&token).unwrap().role(),
            Some(Role::FleetOperator)
        );
    }

    #[test]
    fn unknown_role_decodes_without_role() {
        let token = unsigned_token(&json!({"sub": "u", "role": "driver", "exp": 1}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("driver"));
        assert_eq!(claims.role(), None);
    }

    #[test]
    fn padded_payload_accepted() {
        let token = unsigned_token(&json!({"sub": "u", "exp": 1}));
        let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
        while parts[1].len() % 4 != 0 {
            parts[1].push('=');
        }
        assert!(decode_claims(&parts.join(".")).is_ok());
    }

    #[test]
    fn wrong_segment_count() {
        assert_eq!(decode_claims(""), Err(TokenError::Malformed(1)));
        assert_eq!(decode_claims("a.b"), Err(TokenError::Malformed(2)));
        assert_eq!(decode_claims("a.b.c.d"), Err(TokenError::Malformed(4)));
    }

    #[test]
    fn payload_not_base64() {
        assert_eq!(decode_claims("a.!!!.c"), Err(TokenError::Encoding));
    }

    #[test]
    fn payload_not_json() {
        let payload = URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(
            decode_claims(&format!("h.{payload}.s")),
            Err(TokenError::Json(_))
        ));
    }

    #[test]
    fn missing_exp_is_decode_failure() {
        let token = unsigned_token(&json!({"sub": "u"}));
        assert!(matches!(decode_claims(&token), Err(TokenError::Json(_))));
    }

    #[test]
    fn missing_sub_is_decode_failure() {
        let token = unsigned_token(&json!({"exp": 1}));
        assert!(matches!(decode_claims(&token), Err(TokenError::Json(_))));
    }

    #[test]
    fn expiry_boundary() {
        let credential = Credential::from_token(token_expiring_in(Role::Admin, Duration::HOUR)).unwrap();
        let exp = credential.expires_at();

        assert!(!credential.is_expired_at(exp - Duration::SECOND, Duration::ZERO));
        assert!(credential.is_expired_at(exp, Duration::ZERO));
        assert!(credential.is_expired_at(exp + Duration::SECOND, Duration::ZERO));
        assert!(!credential.is_expired_at(exp, Duration::seconds(30)));
    }

    #[test]
    fn leeway_past_max_timestamp_does_not_overflow() {
        // 9999-12-31T23:59:59Z, the largest `exp` the timestamp codec accepts.
        let token = unsigned_token(&json!({"sub": "u", "exp": 253_402_300_799_i64}));
        let credential = Credential::from_token(token).unwrap();
        let now = OffsetDateTime::now_utc();

        assert!(!credential.is_expired_at(now, Duration::seconds(30)));
        assert!(!credential.is_expired_at(now, Duration::ZERO));
        assert!(credential.is_expired_at(credential.expires_at(), Duration::ZERO));
    }

    #[test]
    fn credential_trims_whitespace() {
        let token = unsigned_token(&json!({"sub": "u", "exp": 1}));
        let credential = Credential::from_token(format!("  {token}\n")).unwrap();
        assert_eq!(credential.token().as_str(), token);
    }
}
