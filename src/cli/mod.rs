use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::api::openapi;
use crate::config::AppConfig;
use crate::database::{init_store, StoreStatus};
use crate::router::{app, product_routes};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "product-api")]
#[command(about = "Products REST API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Address to bind, overrides PRODUCT_API_HOST")]
        host: Option<String>,

        #[arg(long, help = "Port to bind, overrides PRODUCT_API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create the products table if it does not exist")]
    Migrate,

    #[command(about = "Print the OpenAPI document")]
    Openapi {
        #[arg(long, help = "Emit YAML instead of JSON")]
        yaml: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Migrate => migrate(config).await,
        Commands::Openapi { yaml } => {
            let spec = openapi::build_spec(&product_routes());
            let rendered = if yaml {
                openapi::to_yaml(&spec)?
            } else {
                serde_json::to_string_pretty(&spec)?
            };
            println!("{}", rendered);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Products API in {:?} mode", config.environment);

    let store = init_store(&config.database)
        .await
        .context("invalid database configuration")?;
    if let StoreStatus::Degraded(reason) = &store.status {
        tracing::warn!("Serving with a degraded store: {}", reason);
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let router = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Products API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn migrate(mut config: AppConfig) -> anyhow::Result<()> {
    config.database.sync_schema = true;

    let store = init_store(&config.database)
        .await
        .context("invalid database configuration")?;

    match store.status {
        StoreStatus::Ready => {
            println!("products table is up to date");
            Ok(())
        }
        StoreStatus::Degraded(reason) => anyhow::bail!("migration failed: {}", reason),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
