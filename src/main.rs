//! Order Cache - order ingestion with a TTL read-through cache
//!
//! Consumes orders from Kafka, persists them in Postgres and serves lookups
//! over HTTP from a cache warmed at startup.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_cache::api::{create_router, AppState};
use order_cache::ingest::{IngestConfig, IngestionLoop, KafkaSource};
use order_cache::store::{PgOrderStore, PgStoreConfig};
use order_cache::config::ENV_FILE;
use order_cache::{Config, OrderCache, OrderService, SchemaValidator};

/// Main entry point for the order cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from `config.env` and environment variables
/// 3. Connect to Postgres and apply migrations
/// 4. Create the cache with its background sweep
/// 5. Restore the cache from the store
/// 6. Start the Kafka ingestion loop
/// 7. Serve HTTP until SIGINT/SIGTERM, then stop ingestion and the sweep
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order cache service");

    let config = Config::from_env_file(ENV_FILE);
    info!(
        http_addr = %config.http_addr(),
        kafka_topic = %config.kafka_topic,
        cache_ttl_secs = config.cache_ttl,
        sweep_interval_secs = config.sweep_interval,
        "Configuration loaded"
    );

    let store = PgOrderStore::connect(&PgStoreConfig::from(&config))
        .await
        .context("failed to connect to Postgres")?;
    store.migrate().await.context("failed to apply migrations")?;
    let store = Arc::new(store);

    let (cache, sweeper) = OrderCache::with_sweeper(config.cache_ttl(), config.sweep_interval());
    let service = OrderService::new(store.clone(), cache, config.store_timeout());

    // Must finish before the listener is bound, or early reads miss known orders
    match service.restore_cache().await {
        Ok(count) => info!(count, "Cache warmed from store"),
        Err(err) => error!(error = %err, "Cache restore failed, continuing with a cold cache"),
    }

    let validator = SchemaValidator::new().context("failed to compile order schema")?;
    let source = KafkaSource::from_config(&config).context("failed to create Kafka consumer")?;
    let ingest = IngestionLoop::new(source, validator, service.clone(), IngestConfig::from(&config));
    let stop = ingest.stop_handle();
    let cancel = CancellationToken::new();
    let ingest_handle = tokio::spawn(ingest.run(cancel.clone()));

    let app = create_router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr()))?;
    info!("Server listening on http://{}", config.http_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    cancel.cancel();
    stop.stop();
    match ingest_handle.await {
        Ok(report) => info!(?report, "Ingestion stopped"),
        Err(err) => warn!(error = %err, "Ingestion task ended abnormally"),
    }

    sweeper.stop().await;
    store.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
