//! Server lifecycle: open the store, wire the adapters, serve the router.

use std::sync::Arc;

use thiserror::Error;

use crate::api::router::app_router;
use crate::api::types::ApiContext;
use crate::config::AppConfig;
use crate::db::{self, DatabaseError};
use crate::plans::{GeminiClient, PlanGenerator};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the server until the process is terminated.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = db::sqlite::open_database(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "database ready");

    let plans = PlanGenerator::new(Arc::new(GeminiClient::new(&config.generative)));
    let ctx = ApiContext::new(conn, plans);
    let app = app_router(ctx);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "cardioplan listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
