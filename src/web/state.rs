use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;

use super::config::WebConfig;
use super::cookies;
use crate::clock::SystemClock;
use crate::storage::{MemoryStorage, StoredCredential};
use crate::store::SessionStore;
use crate::token::Credential;

/// Shared state for the session routes and the [`Admitted`](super::Admitted)
/// extractor. Use it (or a state it can be extracted from) as router state.
#[derive(Clone)]
pub struct WebState {
    pub(super) config: Arc<WebConfig>,
}

impl WebState {
    #[must_use]
    pub fn new(config: WebConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Session store for a single request, seeded from the credential cookie.
    pub(super) fn request_session(&self, jar: &PrivateCookieJar) -> SessionStore<MemoryStorage> {
        let persisted = cookies::get_token(jar, &self.config.cookie_name)
            .and_then(|token| match Credential::from_token(token) {
                Ok(credential) => Some(StoredCredential::from(&credential)),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring undecodable credential cookie");
                    None
                }
            });
        let storage = persisted.map_or_else(MemoryStorage::new, MemoryStorage::seeded);
        SessionStore::restore_with(storage, SystemClock, self.config.session.clone())
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<WebState> for Key {
    fn from_ref(state: &WebState) -> Self {
        state.config.cookie_key.clone()
    }
}
