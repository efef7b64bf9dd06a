use axum::extract::FromRequestParts;
use http::{StatusCode, request::Parts};

use graph_profile::{AppContext, CoordinationError, Session, load_session, session_id_from_headers};

use super::error::IntoResponseError;

/// Server-side session of the current request, loaded from the session cookie.
///
/// A request without a usable session cookie gets a fresh, empty session.
pub struct SessionContext(pub Session);

impl FromRequestParts<AppContext> for SessionContext {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let cookie = session_id_from_headers(&parts.headers, &state.config.session.cookie_name)
            .map_err(CoordinationError::from)
            .into_response_error()?;

        let session = load_session(state.sessions.as_ref(), cookie)
            .await
            .map_err(CoordinationError::from)
            .into_response_error()?;

        tracing::trace!("Session loaded: new={}", session.is_new());
        Ok(Self(session))
    }
}
