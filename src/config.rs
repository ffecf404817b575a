use time::Duration;

use crate::error::Error;

/// Settings shared by the session store and auth gate.
///
/// Use [`from_env()`](SessionConfig::from_env) for convention-based setup, or
/// [`default()`](SessionConfig::default) with `with_*` methods.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub(crate) login_route: String,
    pub(crate) expiry_leeway: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".into(),
            expiry_leeway: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `BUSMATE_LOGIN_ROUTE`: Where unauthenticated visitors are sent (default `/login`)
    /// - `BUSMATE_EXPIRY_LEEWAY_SECS`: Grace period after `exp` (default `0`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(route) = std::env::var("BUSMATE_LOGIN_ROUTE") {
            if !route.starts_with('/') {
                return Err(Error::Config(format!(
                    "BUSMATE_LOGIN_ROUTE must be an absolute path, got '{route}'"
                )));
            }
            config = config.with_login_route(route);
        }
        if let Ok(secs) = std::env::var("BUSMATE_EXPIRY_LEEWAY_SECS") {
            let secs: u32 = secs
                .parse()
                .map_err(|e| Error::Config(format!("BUSMATE_EXPIRY_LEEWAY_SECS: {e}")))?;
            config = config.with_expiry_leeway(Duration::seconds(i64::from(secs)));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[must_use]
    pub fn with_expiry_leeway(mut self, leeway: Duration) -> Self {
        self.expiry_leeway = leeway;
        self
    }

    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    #[must_use]
    pub fn expiry_leeway(&self) -> Duration {
        self.expiry_leeway
    }
}
