use axum::Router;
use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 5000;

/// Port from `PORT`, 5000 when unset
pub(crate) fn listen_port() -> Result<u16, std::num::ParseIntError> {
    match std::env::var("PORT") {
        Ok(port) => port.parse(),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

pub(crate) async fn serve(port: u16, app: Router) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
