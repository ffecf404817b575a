use axum::response::{IntoResponse, Redirect, Response};

/// Rejection of the [`Admitted`](super::Admitted) extractor.
///
/// Both variants answer with a redirect; there is no error page.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No session, or it expired.
    #[error("Not authenticated")]
    Unauthenticated { redirect_to: String },

    /// Session role isn't allowed on this path.
    #[error("Forbidden for this role")]
    Forbidden { redirect_to: String },
}

impl WebError {
    #[must_use]
    pub fn redirect_to(&self) -> &str {
        match self {
            Self::Unauthenticated { redirect_to } | Self::Forbidden { redirect_to } => redirect_to,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        Redirect::to(self.redirect_to()).into_response()
    }
}
