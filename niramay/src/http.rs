use crate::config::ServerConfig;

pub mod auth;
pub mod error;
pub mod middleware;

pub use auth::CurrentUser;
pub use error::ErrorBody;

pub async fn run(
    router: axum::Router,
    config: &ServerConfig,
) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.host.as_str(),
        config.port
    ))
    .await
    .map_err(|e| anyhow::anyhow!("tcp bind failed: {:?}", e))?;
    tracing::info!(host = %config.host, port = config.port, "http listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("http serve failed: {:?}", e))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
