//! # SEDEKAT Ledger API
//!
//! HTTP server for the admin and reseller dashboards.
//!
//! ## Startup
//! ```text
//! .env (optional) ──► ApiConfig ──► Database (migrations) ──► LedgerService
//!                                                                  │
//!                                      axum::serve ◄── router ◄────┘
//!                                          │
//!                                  Ctrl+C / SIGTERM ──► graceful shutdown
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ledger_api::{router, ApiConfig, AppState};
use sedekat_db::{Database, DbConfig};
use sedekat_ledger::{BalanceCache, LedgerService};

const DEFAULT_LOG_FILTER: &str = "info,sedekat=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!("Starting SEDEKAT ledger API...");

    let config = ApiConfig::load().context("Failed to load configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        max_connections = config.max_connections,
        cache_ttl_secs = config.balance_cache_ttl_secs,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path).max_connections(config.max_connections))
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let ledger = LedgerService::new(db.clone(), BalanceCache::new(config.balance_cache_ttl()));
    let app = router(AppState::new(ledger));

    let addr: SocketAddr = ([0, 0, 0, 0], config.http_port).into();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
