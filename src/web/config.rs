use axum_extra::extract::cookie::Key;

use crate::config::SessionConfig;
use crate::error::Error;

/// Cookie and routing settings for the axum glue.
///
/// Use [`from_env()`](WebConfig::from_env) for convention-based setup,
/// or [`new()`](WebConfig::new) with `with_*` methods for full control.
#[derive(Clone)]
pub struct WebConfig {
    pub(crate) cookie_key: Key,
    pub(crate) cookie_name: String,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) session: SessionConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WebConfig {
    /// Defaults with an ephemeral cookie key; sessions won't survive a restart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookie_key: Key::generate(),
            cookie_name: "__busmate_session".into(),
            secure_cookies: true,
            auth_path: "/auth".into(),
            session: SessionConfig::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `BUSMATE_COOKIE_KEY`: Cookie encryption key bytes (at least 64)
    /// - `BUSMATE_DEV`: Set to `"1"` or `"true"` to disable secure cookies
    /// - `BUSMATE_AUTH_PATH`: Mount point of the session routes (default `/auth`)
    /// - everything [`SessionConfig::from_env`] reads
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let dev = matches!(
            std::env::var("BUSMATE_DEV").as_deref(),
            Ok("1") | Ok("true"),
        );

        let cookie_key = match std::env::var("BUSMATE_COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "BUSMATE_COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => {
                tracing::warn!("BUSMATE_COOKIE_KEY not set, using an ephemeral cookie key");
                Key::generate()
            }
        };

        let mut config = Self::new()
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev)
            .with_session(SessionConfig::from_env()?);

        if let Ok(path) = std::env::var("BUSMATE_AUTH_PATH") {
            if !path.starts_with('/') {
                return Err(Error::Config(format!(
                    "BUSMATE_AUTH_PATH must be an absolute path, got '{path}'"
                )));
            }
            config = config.with_auth_path(path.trim_end_matches('/'));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}
