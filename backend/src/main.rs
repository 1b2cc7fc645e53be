use std::net::SocketAddr;

use anyhow::Context;
use applicant_backend::config::{AppConfig, CorsConfig, StorageBackend};
use applicant_backend::storage::{Connection, DbConnection, MemoryConnection};
use applicant_backend::{create_router, telemetry, AppState};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let addr = config.server.socket_addr()?;

    match config.database.backend {
        StorageBackend::Sqlite => {
            info!("Setting up database");
            let db = DbConnection::new(&config.database.url, config.database.max_connections)
                .await
                .with_context(|| format!("failed to open {}", config.database.url))?;
            serve(db, addr, &config.cors).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on shutdown");
            serve(MemoryConnection::new(), addr, &config.cors).await
        }
    }
}

async fn serve<C: Connection>(connection: C, addr: SocketAddr, cors: &CorsConfig) -> anyhow::Result<()> {
    let app = create_router(AppState::new(connection), cors);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
