//! Shared helpers for the integration tests
//!
//! Servers bind `127.0.0.1:0` so tests can run in parallel.

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use axum::Router;
use secrets_manager_sdk::auth::NoAuthAuthenticator;
use secrets_manager_sdk::config::ExternalConfig;
use secrets_manager_sdk::{SecretsManager, SecretsManagerOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client for `url` without authentication or external configuration
pub fn service(url: &str) -> SecretsManager {
    SecretsManager::with_external_config(
        SecretsManagerOptions {
            url: Some(url.to_string()),
            authenticator: Some(Arc::new(NoAuthAuthenticator)),
            ..Default::default()
        },
        &ExternalConfig::default(),
    )
    .expect("service should build")
}

/// Client against a fresh in-memory mock server
pub async fn mock_service() -> SecretsManager {
    init_tracing();
    let (addr, _server) = mock_server::spawn("127.0.0.1:0")
        .await
        .expect("mock server should bind");
    service(&format!("http://{addr}"))
}

/// Serve a purpose-built router and return its base URL
pub async fn serve(router: Router) -> String {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}
