//! meshimap server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use meshimap::api;
use meshimap::app_state::AppState;
use meshimap::config::{LogFormat, MeshimapConfig, StoreBackend};
use meshimap::domain::EventBus;
use meshimap::geocode::{Geocoder, GsiGeocoder};
use meshimap::store::{DocumentStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MeshimapConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        backend = ?config.store_backend,
        "starting meshimap"
    );

    let store = build_store(&config).await?;
    let geocoder: Arc<dyn Geocoder> = Arc::new(
        GsiGeocoder::new(
            &config.geocoder_url,
            Duration::from_secs(config.geocoder_timeout_secs),
        )
        .context("building geocoder client")?,
    );
    let event_bus = EventBus::new(config.event_bus_capacity);

    let app_state = AppState::new(
        store,
        geocoder,
        event_bus,
        config.ranking_limit,
        config.calendar_offset,
    );
    let app = api::build_app(
        app_state,
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn build_store(config: &MeshimapConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .min_connections(config.database_min_connections)
                .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
                .connect(&config.database_url)
                .await
                .context("connecting to PostgreSQL")?;
            let store = PostgresStore::new(pool);
            store.migrate().await.context("running migrations")?;
            tracing::info!("PostgreSQL store ready");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
