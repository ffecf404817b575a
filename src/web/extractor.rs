use axum::extract::{FromRef, FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;

use super::error::WebError;
use super::state::WebState;
use crate::gate::{AuthGate, GateDecision};
use crate::router::{Shell, required_roles_for_path, select_shell};
use crate::token::Credential;
use crate::types::RoleSet;

/// A request that passed the auth gate for its path.
///
/// Use as an Axum extractor in page handlers, with [`WebState`] or any state
/// it can be extracted from via [`FromRef`]. The path is the one the client
/// requested, so gating holds inside nested routers. Rejects with a redirect to the
/// login route (no or expired session) or to the session's own shell home
/// (role not allowed on this path).
///
/// # Example
///
/// ```rust,ignore
/// async fn operator_fleet(session: Admitted) -> impl IntoResponse {
///     format!("{} fleet for {}", session.shell, session.credential.claims().sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Admitted {
    pub credential: Credential,
    /// Shell the session's role belongs to.
    pub shell: Shell,
}

impl<S> FromRequestParts<S> for Admitted
where
    S: Send + Sync,
    WebState: FromRef<S>,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = WebState::from_ref(state);
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, &state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        // Nested routers strip their prefix from `parts.uri`.
        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_owned(),
            None => parts.uri.path().to_owned(),
        };
        let required = required_roles_for_path(&path).unwrap_or(RoleSet::Any);
        let store = state.request_session(&jar);

        // The rejection carries the redirect, nothing to navigate here.
        match AuthGate::new(required).check(&store, &mut |_: &str| {}) {
            GateDecision::Admit(credential) => {
                let shell = select_shell(credential.role());
                Ok(Self { credential, shell })
            }
            GateDecision::Unauthenticated { redirect_to } => {
                Err(WebError::Unauthenticated { redirect_to })
            }
            GateDecision::Forbidden { redirect_to } => Err(WebError::Forbidden { redirect_to }),
        }
    }
}
