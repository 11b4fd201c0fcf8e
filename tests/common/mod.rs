#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use product_api::config::{AppConfig, Environment, StoreBackend};
use product_api::database::{MemoryProductRepository, Store};
use product_api::router::app;
use product_api::state::AppState;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Development);
    config.database.backend = StoreBackend::Memory;
    config.security.cors_origin = Some("http://frontend.test".to_string());
    config
}

/// Router over a fresh in-memory store, for `oneshot` tests
pub fn test_router() -> axum::Router {
    let store = Store::ready(Arc::new(MemoryProductRepository::new()));
    app(AppState::new(store, test_config()))
}

/// Serve a fresh in-memory app on an unused port. Each call gets its own store.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", base_url))?;

    let router = test_router();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer { port, base_url })
}
