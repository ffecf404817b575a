//! Server-side glue for axum applications serving the BUSMATE dashboards.
//!
//! The credential lives in a private (encrypted) cookie. Each request rebuilds
//! a request-scoped [`SessionStore`](crate::SessionStore) from it and runs the
//! [`AuthGate`](crate::AuthGate) for the request path.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use busmate_session::web::{Admitted, WebConfig, WebState, session_routes};
//!
//! let state = WebState::new(WebConfig::from_env()?);
//!
//! async fn mot_dashboard(session: Admitted) -> String {
//!     format!("Welcome, {}", session.credential.claims().sub)
//! }
//!
//! let app = axum::Router::new()
//!     .route("/mot", axum::routing::get(mot_dashboard))
//!     .with_state(state.clone())
//!     .merge(session_routes(&state));
//! ```
//!
//! The cookie is encrypted by the server, but the token inside is still not
//! signature-checked here. The REST API remains the authorization boundary.

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;

pub use config::WebConfig;
pub use error::WebError;
pub use extractor::Admitted;
pub use routes::session_routes;
pub use state::WebState;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
