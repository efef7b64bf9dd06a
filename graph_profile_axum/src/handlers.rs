use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, StatusCode, header::HOST};
use std::collections::HashMap;

use graph_profile::{
    AppContext, CoordinationError, Page, ProfileForm, Session, authorized_core, destroy_session,
    index_core, login_core, logout_core, profile_get_core, profile_post_core, rotate_session,
    save_session, users_core,
};

use super::error::IntoResponseError;
use super::session::SessionContext;
use super::views::render_page;

type HandlerResult = Result<Response, (StatusCode, String)>;

fn host(headers: &HeaderMap) -> Option<&str> {
    headers.get(HOST).and_then(|h| h.to_str().ok())
}

/// Persist the session if it changed, then render the page with its cookie
async fn respond(ctx: &AppContext, session: &Session, page: Page) -> HandlerResult {
    let cookie_headers = save_session(ctx.sessions.as_ref(), session, &ctx.config.session)
        .await
        .map_err(CoordinationError::from)
        .into_response_error()?;
    let body = render_page(&page)?;
    Ok((cookie_headers, body).into_response())
}

pub(super) async fn login(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
    headers: HeaderMap,
) -> HandlerResult {
    let page = login_core(&ctx, &mut session.data, host(&headers))
        .await
        .into_response_error()?;
    respond(&ctx, &session, page).await
}

pub(super) async fn authorized(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let page = authorized_core(&ctx, &mut session.data, &params)
        .await
        .into_response_error()?;
    // Signed in: retire the id handed out by /login
    if let Page::Redirect { .. } = page {
        rotate_session(ctx.sessions.as_ref(), &mut session)
            .await
            .map_err(CoordinationError::from)
            .into_response_error()?;
    }
    respond(&ctx, &session, page).await
}

pub(super) async fn logout(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
    headers: HeaderMap,
) -> HandlerResult {
    let page = logout_core(&ctx, &mut session.data, host(&headers))
        .await
        .into_response_error()?;
    let cookie_headers = destroy_session(ctx.sessions.as_ref(), &session, &ctx.config.session)
        .await
        .map_err(CoordinationError::from)
        .into_response_error()?;

    let Page::Redirect { location } = page else {
        return Ok((cookie_headers, render_page(&page)?).into_response());
    };
    Ok((cookie_headers, Redirect::to(&location)).into_response())
}

pub(super) async fn index(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
) -> HandlerResult {
    let page = index_core(&ctx, &mut session.data)
        .await
        .into_response_error()?;
    respond(&ctx, &session, page).await
}

pub(super) async fn get_profile(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
) -> HandlerResult {
    let page = profile_get_core(&ctx, &mut session.data)
        .await
        .into_response_error()?;
    respond(&ctx, &session, page).await
}

pub(super) async fn post_profile(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
    Form(form): Form<ProfileForm>,
) -> HandlerResult {
    let page = profile_post_core(&ctx, &mut session.data, &form)
        .await
        .into_response_error()?;
    respond(&ctx, &session, page).await
}

pub(super) async fn users(
    State(ctx): State<AppContext>,
    SessionContext(mut session): SessionContext,
) -> HandlerResult {
    let page = users_core(&ctx, &mut session.data)
        .await
        .into_response_error()?;
    respond(&ctx, &session, page).await
}

pub(super) async fn health() -> &'static str {
    "OK"
}
