//! recipes-api - Recipe CRUD microservice
//!
//! Serves the recipes collection over JSON/HTTP. The database is opened and
//! pinged once at startup; failure there ends the process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use recipes_common::config::{ConfigOverrides, ServiceConfig};
use recipes_common::db;
use recipes_api::store::RecipeStore;
use recipes_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for recipes-api
///
/// Unset values fall back to environment variables, the config file, then
/// built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "recipes-api")]
#[command(about = "Recipe CRUD microservice")]
#[command(version)]
struct Args {
    /// Database connection URI or storage directory
    #[arg(long)]
    database_uri: Option<String>,

    /// Database name
    #[arg(long)]
    database: Option<String>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            database_uri: args.database_uri,
            database_name: args.database,
            bind: args.bind,
            port: args.port,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipes_api=info,recipes_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting recipes-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let overrides = ConfigOverrides::from(Args::parse());
    let config = ServiceConfig::resolve(&overrides).context("Failed to load configuration")?;

    let database_url = config.database_url();
    info!("Database: {}", database_url);

    let pool = match db::init_database(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let state = AppState::from_pool(pool.clone());

    if let Err(e) = state.store.ping().await {
        error!("Database connectivity check failed: {}", e);
        return Err(e).context("Database connectivity check failed");
    }
    info!("✓ Connected to database '{}'", config.database_name);

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("recipes-api listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
