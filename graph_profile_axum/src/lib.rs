//! Axum integration for graph-profile

mod error;
mod handlers;
mod router;
mod session;
mod views;

#[cfg(test)]
mod test_utils;

pub use router::{app_router, app_router_no_trace};
pub use session::SessionContext;

pub use graph_profile::{AppConfig, AppContext};
