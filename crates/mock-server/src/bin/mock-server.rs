//! Secrets Manager Mock Server
//!
//! Serves the in-memory Secrets Manager API for local development.
//!
//! Environment Variables:
//! - HOST: Address to bind (default: 0.0.0.0)
//! - PORT: Port to listen on (default: 1234)
//! - RUST_LOG: Log filter (default: secrets_manager_mock_server=info,mock_server=info,tower_http=info)

use anyhow::{Context, Result};
use mock_server::{router, AppState, ServerConfig};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("secrets_manager_mock_server=info,mock_server=info,tower_http=info")
            }),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();
    let address = config.bind_address();

    let app = router(AppState::new()).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Secrets Manager mock server ready at http://{}", address);

    axum::serve(listener, app)
        .await
        .context("mock server terminated")?;
    Ok(())
}
