//! Gateway server binary: read config, connect to the event store with
//! backoff, serve the CRUD gateway on `0.0.0.0:9090`.

use anyhow::Context;
use crudstore_client::{HttpEventStore, RetryPolicy, retry_with_backoff};
use crudstore_engine::CrudStore;
use crudstore_web::{AppState, Config, routes};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::debug!(
        db_uri = %config.db_uri,
        db_uri_listview = %config.db_uri_listview,
        event_store = %config.event_store_endpoint,
        "loaded configuration"
    );

    let estore = Arc::new(HttpEventStore::new(&config.event_store_endpoint));
    retry_with_backoff(&RetryPolicy::connect(), || estore.healtz())
        .await
        .context("event store did not become reachable")?;

    let state = AppState::new(CrudStore::new(estore));
    let app = routes(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:9090")
        .await
        .context("failed to bind 0.0.0.0:9090")?;
    tracing::info!("crudstore gateway listening on 0.0.0.0:9090");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
