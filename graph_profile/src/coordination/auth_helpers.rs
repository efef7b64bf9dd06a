use crate::oauth2::{AccessToken, ErrorCode, ErrorResult, OAuth2Error};
use crate::session::SessionData;

use super::context::AppContext;
use super::errors::CoordinationError;
use super::types::Page;

pub(super) enum Access {
    Granted(AccessToken),
    Denied(Page),
}

pub(super) fn unauthorized_page() -> Page {
    Page::AuthError {
        result: ErrorResult::new(
            ErrorCode::Code("401 Unauthorized".to_string()),
            "You need to be logged in to access this page.",
        ),
    }
}

/// Render identity rejections, propagate faults
pub(super) fn rejection_or_fault(err: OAuth2Error) -> Result<Page, CoordinationError> {
    let fault = err.clone();
    match err.into_error_result() {
        Some(result) => {
            tracing::debug!("Identity rejection: {}", result);
            Ok(Page::AuthError { result })
        }
        None => Err(fault.into()),
    }
}

/// Require a signed-in user and an access token for the configured scopes
/// before any directory call.
pub(super) async fn directory_access(
    ctx: &AppContext,
    session: &mut SessionData,
) -> Result<Access, CoordinationError> {
    if ctx.auth.get_user(session).is_none() {
        tracing::debug!("No signed-in user");
        return Ok(Access::Denied(unauthorized_page()));
    }

    match ctx
        .auth
        .get_token_for_user(session, &ctx.config.scopes)
        .await
    {
        Ok(token) => Ok(Access::Granted(token)),
        Err(err) => rejection_or_fault(err).map(Access::Denied),
    }
}
