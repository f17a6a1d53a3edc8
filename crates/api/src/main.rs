use std::sync::Arc;

use anyhow::Context;

use shoplist_api::{ApiConfig, app::SharedStore, build_app};
use shoplist_infra::InMemoryItemStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shoplist_observability::init();

    let config = ApiConfig::from_env();
    let store: SharedStore = Arc::new(InMemoryItemStore::new());
    let app = build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        max_body_bytes = config.max_body_bytes,
        body_read_timeout_ms = config.body_read_timeout.as_millis() as u64,
        "shopping list API listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
