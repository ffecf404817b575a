use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use time::OffsetDateTime;

use super::cookies;
use super::state::WebState;
use crate::router::select_shell;
use crate::token::Credential;

/// Create the BUSMATE session router.
///
/// - `POST {auth_path}/session`: sign in with a form field `access_token`
/// - `GET|POST {auth_path}/logout`: sign out
/// - `GET {auth_path}/home`: redirect to the current session's shell
pub fn session_routes(state: &WebState) -> Router {
    let auth_path = state.config.auth_path.clone();

    Router::new()
        .route(&format!("{auth_path}/session"), post(sign_in))
        .route(
            &format!("{auth_path}/logout"),
            get(sign_out).post(sign_out),
        )
        .route(&format!("{auth_path}/home"), get(home))
        .with_state(state.clone())
}

// ── Sign in ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SignInForm {
    access_token: String,
}

async fn sign_in(
    State(state): State<WebState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignInForm>,
) -> Result<(PrivateCookieJar, Redirect), Response> {
    let config = &state.config;
    let login_route = config.session.login_route();

    let credential = Credential::from_token(form.access_token).map_err(|e| {
        tracing::warn!(error = %e, "Sign-in with undecodable token");
        login_error(login_route, "invalid_token")
    })?;

    if credential.is_expired_at(OffsetDateTime::now_utc(), config.session.expiry_leeway()) {
        tracing::warn!(subject = %credential.claims().sub, "Sign-in with expired token");
        return Err(login_error(login_route, "session_expired"));
    }

    let shell = select_shell(credential.role());
    let cookie = cookies::credential_cookie(
        &config.cookie_name,
        credential.token().as_str(),
        credential.expires_at(),
        config.secure_cookies,
    );

    tracing::info!(
        subject = %credential.claims().sub,
        shell = %shell,
        "BUSMATE sign-in successful"
    );

    Ok((jar.add(cookie), Redirect::to(shell.home_route())))
}

// ── Sign out ───────────────────────────────────────────────────────

async fn sign_out(
    State(state): State<WebState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if cookies::get_token(&jar, &state.config.cookie_name).is_some() {
        tracing::info!("BUSMATE sign-out");
    }

    let clear_cookie = cookies::clear_credential_cookie(&state.config.cookie_name);
    (
        jar.remove(clear_cookie),
        Redirect::to(state.config.session.login_route()),
    )
}

// ── Home ───────────────────────────────────────────────────────────

async fn home(State(state): State<WebState>, jar: PrivateCookieJar) -> Redirect {
    match state.request_session(&jar).claims() {
        Some(claims) => Redirect::to(select_shell(claims.role()).home_route()),
        None => Redirect::to(state.config.session.login_route()),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(login_route: &str, code: &str) -> Response {
    let encoded = urlencoding::encode(code);
    Redirect::to(&format!("{login_route}?error={encoded}")).into_response()
}
