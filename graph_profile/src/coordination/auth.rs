use std::collections::HashMap;

use crate::session::SessionData;

use super::auth_helpers::rejection_or_fault;
use super::context::AppContext;
use super::errors::CoordinationError;
use super::types::Page;

/// Start sign-in for the configured scopes, coming back to the callback route
#[tracing::instrument(skip(ctx, session))]
pub async fn login_core(
    ctx: &AppContext,
    session: &mut SessionData,
    host: Option<&str>,
) -> Result<Page, CoordinationError> {
    let redirect_uri = ctx.config.external_url(host, &ctx.config.redirect_path);
    let redirect = ctx
        .auth
        .log_in(session, &ctx.config.scopes, &redirect_uri, Some("select_account"))
        .await?;

    Ok(Page::Login {
        auth_uri: redirect.auth_uri,
    })
}

/// Finish sign-in with the parameters the provider sent to the callback
#[tracing::instrument(skip_all)]
pub async fn authorized_core(
    ctx: &AppContext,
    session: &mut SessionData,
    params: &HashMap<String, String>,
) -> Result<Page, CoordinationError> {
    match ctx.auth.complete_log_in(session, params).await {
        Ok(claims) => {
            tracing::info!("User signed in: {}", claims.sub);
            Ok(Page::Redirect {
                location: "/".to_string(),
            })
        }
        Err(err) => rejection_or_fault(err),
    }
}

/// Sign out and send the browser to the provider, which returns it home
#[tracing::instrument(skip(ctx, session))]
pub async fn logout_core(
    ctx: &AppContext,
    session: &mut SessionData,
    host: Option<&str>,
) -> Result<Page, CoordinationError> {
    let home = ctx.config.external_url(host, "/");
    let location = ctx.auth.log_out(session, &home).await?;
    Ok(Page::Redirect { location })
}

#[tracing::instrument(skip_all)]
pub async fn index_core(
    ctx: &AppContext,
    session: &mut SessionData,
) -> Result<Page, CoordinationError> {
    match ctx.auth.get_user(session) {
        Some(user) => Ok(Page::Home { user }),
        None => Ok(Page::Redirect {
            location: "/login".to_string(),
        }),
    }
}
