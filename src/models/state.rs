use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, info};

use crate::services::{blob_store::BlobStore, metrics::MetricsSink};
use crate::utils::constant::DEFAULT_EXTERNAL_CALL_TIMEOUT;

/// Application state shared across requests. Needs to be thread-safe.
///
/// Every collaborator is constructed at startup and handed in here; the
/// handlers hold no other shared state.
pub struct AppState {
    /// The PostgreSQL database connection pool.
    pub db_pool: PgPool,
    /// Object storage for uploaded file content.
    pub blob_store: Arc<dyn BlobStore>,
    /// Sink for counters and timing samples.
    pub metrics: Arc<dyn MetricsSink>,
    /// Deadline applied to each database or blob store call.
    pub external_call_timeout: Duration,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `db_pool` - PostgreSQL database connection pool
    /// * `blob_store` - Object storage backend
    /// * `metrics` - Metric sink
    pub fn new(
        db_pool: PgPool,
        blob_store: Arc<dyn BlobStore>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        info!(
            blob_location = %blob_store.location(),
            "Initializing application state"
        );

        Self {
            db_pool,
            blob_store,
            metrics,
            external_call_timeout: DEFAULT_EXTERNAL_CALL_TIMEOUT,
        }
    }

    /// Overrides the deadline applied to external calls.
    pub fn with_external_call_timeout(mut self, timeout: Duration) -> Self {
        debug!(?timeout, "Setting external call timeout");
        self.external_call_timeout = timeout;
        self
    }
}
