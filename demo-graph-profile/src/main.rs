use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graph_profile::{AppConfig, AppContext};
use graph_profile_axum::app_router;

mod server;

use crate::server::{listen_port, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,graph_profile=debug,graph_profile_axum=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!("Configuration: {:?}", config);

    let ctx = AppContext::init(config).await?;
    let app = app_router(ctx);

    serve(listen_port()?, app).await?;
    Ok(())
}
