/// Crate-level error.
///
/// The session store and auth gate never return this; they resolve every
/// failure to "no session" or a redirect. It surfaces from configuration,
/// storage backends and the REST client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Credential storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "api")]
    #[error("{operation} failed (status {status:?}): {detail}")]
    Api {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
}

/// Reasons a credential cannot be decoded into identity claims.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TokenError {
    #[error("expected 3 token segments, got {0}")]
    Malformed(usize),
    #[error("payload is not valid base64url")]
    Encoding,
    #[error("invalid claims: {0}")]
    Json(String),
}
