use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use webapp::{
    app,
    config::{self, AppEnv, BlobStoreConfig, Config},
    models::AppState,
    services::{
        blob_store::{BlobStore, MemoryBlobStore, S3BlobStore},
        metrics::{MetricsSink, NoopMetrics, RecorderMetrics},
    },
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let log_file = config::log_file_from_env();
    telemetry::init_subscriber(AppEnv::from_env(), log_file.as_deref());

    let config =
        Config::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.external_call_timeout)
        .connect(&config.database_url)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to database"))?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to run database migrations"))?;
    info!("Database synchronized");

    let blob_store: Arc<dyn BlobStore> = match config.blob_store {
        BlobStoreConfig::S3 { bucket, region } => Arc::new(S3BlobStore::new(bucket, region).await),
        BlobStoreConfig::Memory => {
            warn!("Using in-memory blob store, uploaded files will not survive a restart");
            Arc::new(MemoryBlobStore::new("memory"))
        }
    };

    let metrics: Arc<dyn MetricsSink> = match config.metrics_addr {
        Some(addr) => {
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .inspect_err(|e| error!(error = %e, "Failed to install metrics exporter"))?;
            info!(%addr, "Metrics exporter listening");
            Arc::new(RecorderMetrics)
        }
        None => Arc::new(NoopMetrics),
    };

    let state = AppState::new(db_pool, blob_store, metrics)
        .with_external_call_timeout(config.external_call_timeout);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server running");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
