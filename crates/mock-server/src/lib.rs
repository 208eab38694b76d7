//! # Secrets Manager Mock Server
//!
//! In-memory implementation of the Secrets Manager REST API. Routes are
//! registered from the shared [`paths`] templates, so the server and the SDK
//! agree on every path by construction.
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! let (addr, _server) = mock_server::spawn("127.0.0.1:0").await?;
//! println!("mock listening on http://{addr}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod handlers;
pub mod store;

use axum::routing::{get, post, put};
use axum::Router;
use paths::SecretsManagerOperation as Op;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use config::ServerConfig;
pub use errors::ApiError;
pub use store::Store;

/// Shared server state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Router serving every Secrets Manager endpoint plus `/health`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            Op::CreateSecretGroup.template(),
            post(handlers::create_secret_group).get(handlers::list_secret_groups),
        )
        .route(
            Op::GetSecretGroup.template(),
            get(handlers::get_secret_group)
                .put(handlers::update_secret_group_metadata)
                .delete(handlers::delete_secret_group),
        )
        .route(Op::ListAllSecrets.template(), get(handlers::list_all_secrets))
        .route(
            Op::CreateSecret.template(),
            post(handlers::create_secret).get(handlers::list_secrets),
        )
        .route(
            Op::GetSecret.template(),
            get(handlers::get_secret)
                .post(handlers::update_secret)
                .delete(handlers::delete_secret),
        )
        .route(
            Op::GetSecretMetadata.template(),
            get(handlers::get_secret_metadata).put(handlers::update_secret_metadata),
        )
        .route(
            Op::PutPolicy.template(),
            put(handlers::put_policy).get(handlers::get_policy),
        )
        .route(
            Op::PutConfig.template(),
            put(handlers::put_config).get(handlers::get_config),
        )
        .with_state(state)
}

/// Bind `addr` and serve a fresh store in the background
///
/// # Errors
///
/// The address cannot be bound.
pub async fn spawn(addr: impl ToSocketAddrs) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(AppState::new());
    info!(%local, "mock server listening");
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "mock server stopped");
        }
    });
    Ok((local, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operation_template_is_routed() {
        let routed = [
            Op::CreateSecretGroup,
            Op::GetSecretGroup,
            Op::ListAllSecrets,
            Op::CreateSecret,
            Op::GetSecret,
            Op::GetSecretMetadata,
            Op::PutPolicy,
            Op::PutConfig,
        ]
        .map(|op| op.template());
        for op in Op::ALL {
            assert!(routed.contains(&op.template()), "{} not routed", op.name());
        }
    }
}
