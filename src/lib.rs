#![doc = include_str!("../README.md")]

#[cfg(feature = "api")]
pub mod api;
pub mod clock;
pub mod config;
pub mod dto;
pub mod error;
pub mod gate;
pub mod profile;
pub mod router;
pub mod storage;
pub mod store;
pub mod token;
pub mod types;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
#[cfg(feature = "api")]
pub use api::{ApiClient, ApiConfig};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SessionConfig;
pub use error::{Error, TokenError};
pub use gate::{AuthGate, GateDecision, GateState, Navigator};
pub use profile::{ProfileField, ProfileView};
pub use router::{NavItem, Shell, select_shell};
pub use storage::{CredentialStorage, FileStorage, MemoryStorage, StoredCredential};
pub use store::{SessionChange, SessionStore, SessionSubscription};
pub use token::{Credential, IdentityClaims, decode_claims};
pub use types::{AccessToken, Role, RoleSet, SubjectId};
