use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{app, AppState};
use crate::config;
use crate::database::{DatabaseManager, MemoryStore, PgStore, RecordStore};
use crate::is_production;

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Marketplace API in {:?} mode", config.environment);

    let store: Arc<dyn RecordStore> = if in_memory {
        if is_production!() {
            anyhow::bail!("--in-memory is not available in production");
        }
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        DatabaseManager::init(&config.database)
            .await
            .context("failed to connect to the database")?;
        Arc::new(PgStore::new())
    };

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; login and protected routes will fail");
    }

    let state = AppState::new(store, config)?;
    let router = app(state, &config.security);

    let bind_addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Marketplace API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
