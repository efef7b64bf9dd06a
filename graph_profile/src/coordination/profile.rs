use http::StatusCode;

use crate::directory::{GraphError, ProfilePatch, get_me, list_users, update_user};
use crate::oauth2::{ErrorCode, ErrorResult};
use crate::session::SessionData;

use super::auth_helpers::{Access, directory_access};
use super::context::AppContext;
use super::errors::CoordinationError;
use super::types::{Page, ProfileForm};

fn profile_error(status: StatusCode) -> Page {
    Page::AuthError {
        result: ErrorResult::new(status.as_u16(), "Error accessing profile."),
    }
}

/// Profile of the signed-in user from `GET /me`
#[tracing::instrument(skip_all)]
pub async fn profile_get_core(
    ctx: &AppContext,
    session: &mut SessionData,
) -> Result<Page, CoordinationError> {
    let token = match directory_access(ctx, session).await? {
        Access::Granted(token) => token,
        Access::Denied(page) => return Ok(page),
    };

    let response = ctx
        .directory
        .send(get_me(&ctx.config.graph_endpoint, token))
        .await?;

    Ok(match response.outcome(StatusCode::OK) {
        Ok(user) => Page::Profile {
            user,
            result: Some(response.status.as_u16()),
        },
        Err(err) => {
            tracing::warn!("Profile fetch failed with {}", err.status);
            profile_error(err.status)
        }
    })
}

/// Update phone numbers with `PATCH /users/{id}`, then show the fresh profile
#[tracing::instrument(skip(ctx, session, form), fields(user_id = %form.id))]
pub async fn profile_post_core(
    ctx: &AppContext,
    session: &mut SessionData,
    form: &ProfileForm,
) -> Result<Page, CoordinationError> {
    let token = match directory_access(ctx, session).await? {
        Access::Granted(token) => token,
        Access::Denied(page) => return Ok(page),
    };

    if form.id.is_empty() {
        return Ok(Page::AuthError {
            result: ErrorResult::new("invalid_request", "Missing user id."),
        });
    }

    let endpoint = &ctx.config.graph_endpoint;
    let patch = ProfilePatch::from_form(form.mobile_phone.clone(), form.business_phone.clone());
    let response = ctx
        .directory
        .send(update_user(endpoint, token.clone(), &form.id, &patch)?)
        .await?;

    if response.status != StatusCode::NO_CONTENT {
        let err = GraphError::from_response(&response);
        tracing::warn!("Profile update failed with {}: {:?}", err.status, err.code);
        let code = match err.code {
            Some(code) => ErrorCode::Code(code),
            None => ErrorCode::Status(err.status.as_u16()),
        };
        return Ok(Page::AuthError {
            result: ErrorResult::new(code, err.message.unwrap_or_default()),
        });
    }

    let refreshed = ctx.directory.send(get_me(endpoint, token)).await?;
    Ok(match refreshed.outcome(StatusCode::OK) {
        Ok(user) => Page::Profile { user, result: None },
        Err(err) => profile_error(err.status),
    })
}

/// First page of directory users from `GET /users`
#[tracing::instrument(skip_all)]
pub async fn users_core(
    ctx: &AppContext,
    session: &mut SessionData,
) -> Result<Page, CoordinationError> {
    let token = match directory_access(ctx, session).await? {
        Access::Granted(token) => token,
        Access::Denied(page) => return Ok(page),
    };

    let response = ctx
        .directory
        .send(list_users(&ctx.config.graph_endpoint, token))
        .await?;

    Ok(match response.outcome(StatusCode::OK) {
        Ok(result) => Page::Users { result },
        Err(err) => {
            tracing::warn!("User listing failed with {}", err.status);
            Page::AuthError {
                result: ErrorResult::new(
                    err.status.as_u16(),
                    err.message
                        .unwrap_or_else(|| "Error accessing users.".to_string()),
                ),
            }
        }
    })
}
