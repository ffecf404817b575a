//! The client-side session store.
//!
//! Holds the current [`Credential`], mirrors it into a [`CredentialStorage`]
//! and broadcasts every change. Writes are expected from a single event loop;
//! readers may live anywhere.

use time::OffsetDateTime;
use tokio::sync::watch;

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::storage::{CredentialStorage, StoredCredential};
use crate::token::{Credential, IdentityClaims};

/// Change observed by a [`SessionSubscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(Credential),
    SignedOut,
}

pub struct SessionStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    config: SessionConfig,
    state: watch::Sender<Option<Credential>>,
}

impl<S: CredentialStorage> SessionStore<S> {
    /// Restore the session persisted in `storage`, using the system clock
    /// and default settings.
    pub fn restore(storage: S) -> Self {
        Self::restore_with(storage, SystemClock, SessionConfig::default())
    }
}

impl<S: CredentialStorage, C: Clock> SessionStore<S, C> {
    /// Restore the session persisted in `storage`.
    ///
    /// Records that can't be decoded or are already expired are removed.
    pub fn restore_with(storage: S, clock: C, config: SessionConfig) -> Self {
        let initial = match storage.load() {
            Ok(Some(record)) => match Credential::from_token(record.token) {
                Ok(credential) if !credential.is_expired_at(clock.now(), config.expiry_leeway) => {
                    tracing::debug!(subject = %credential.claims().sub, "Restored persisted session");
                    Some(credential)
                }
                Ok(_) => {
                    tracing::debug!("Persisted credential expired, discarding");
                    remove_persisted(&storage);
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted credential undecodable, discarding");
                    remove_persisted(&storage);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted credential");
                None
            }
        };

        let (state, _) = watch::channel(initial);
        Self {
            storage,
            clock,
            config,
            state,
        }
    }

    /// Decode `token`, store and persist it, and notify subscribers.
    ///
    /// The signature is not verified. An undecodable token clears the session
    /// instead; the return value is `None` in that case. A token that is
    /// already expired is held in memory (where [`credential`](Self::credential)
    /// hides it) but never persisted.
    pub fn set_credential(&self, token: impl Into<String>) -> Option<IdentityClaims> {
        let credential = match Credential::from_token(token) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected undecodable credential, clearing session");
                self.clear_credential();
                return None;
            }
        };

        if credential.is_expired_at(self.clock.now(), self.config.expiry_leeway) {
            tracing::warn!(subject = %credential.claims().sub, "Credential already expired, not persisting");
            remove_persisted(&self.storage);
        } else if let Err(e) = self.storage.save(&StoredCredential::from(&credential)) {
            tracing::warn!(error = %e, "Failed to persist credential");
        }

        let claims = credential.claims().clone();
        tracing::info!(
            subject = %claims.sub,
            role = ?claims.role(),
            expires_at = %claims.exp,
            "Session credential set"
        );
        self.state.send_replace(Some(credential));
        Some(claims)
    }

    /// Drop the credential and its persisted copy, and notify subscribers.
    pub fn clear_credential(&self) {
        remove_persisted(&self.storage);
        if self.state.send_replace(None).is_some() {
            tracing::info!("Session credential cleared");
        }
    }

    /// The current credential, or `None` if absent or expired.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        let now = self.clock.now();
        self.state
            .borrow()
            .as_ref()
            .filter(|c| !c.is_expired_at(now, self.config.expiry_leeway))
            .cloned()
    }

    #[must_use]
    pub fn claims(&self) -> Option<IdentityClaims> {
        self.credential().map(|c| c.claims().clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.state.subscribe(),
        }
    }

    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn remove_persisted<S: CredentialStorage>(storage: &S) {
    if let Err(e) = storage.remove() {
        tracing::warn!(error = %e, "Failed to remove persisted credential");
    }
}

/// Receives a notification for every `set_credential` / `clear_credential`.
///
/// Only the latest change is retained; a slow subscriber skips intermediate
/// ones. Expiry is not applied here, check with the store before trusting it.
pub struct SessionSubscription {
    rx: watch::Receiver<Option<Credential>>,
}

impl SessionSubscription {
    /// Wait for the next change. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<SessionChange> {
        self.rx.changed().await.ok()?;
        Some(to_change(self.rx.borrow_and_update().clone()))
    }

    /// Whether a change arrived since the last [`changed`](Self::changed).
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    #[must_use]
    pub fn current(&self) -> SessionChange {
        to_change(self.rx.borrow().clone())
    }
}

fn to_change(state: Option<Credential>) -> SessionChange {
    match state {
        Some(credential) => SessionChange::SignedIn(credential),
        None => SessionChange::SignedOut,
    }
}
