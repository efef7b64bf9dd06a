//! Routes of the profile application

use axum::{Router, routing::get};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use graph_profile::AppContext;

use super::handlers;

/// Router for the sign-in, profile and users pages
///
/// The callback route is mounted at the configured redirect path.
pub fn app_router(ctx: AppContext) -> Router {
    app_router_no_trace(ctx).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same routes as [`app_router`] without the HTTP tracing middleware
pub fn app_router_no_trace(ctx: AppContext) -> Router {
    let redirect_path = ctx.config.redirect_path.clone();
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login))
        .route(&redirect_path, get(handlers::authorized))
        .route("/logout", get(handlers::logout))
        .route(
            "/profile",
            get(handlers::get_profile).post(handlers::post_profile),
        )
        .route("/users", get(handlers::users))
        .route("/health", get(handlers::health))
        .with_state(ctx)
}
