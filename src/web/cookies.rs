use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Cookie carrying the raw token; it expires together with the token.
pub(super) fn credential_cookie(
    name: &str,
    token: &str,
    expires_at: OffsetDateTime,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .expires(expires_at)
        .build()
}

/// Create removal cookie for the credential.
pub(super) fn clear_credential_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

pub(super) fn get_token(jar: &PrivateCookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|c| c.value().to_string())
}
