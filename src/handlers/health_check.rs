//! # Health Check Handler
//!
//! Liveness endpoint used by load balancers and deployment tooling. A check
//! only passes if the database accepts a write, so a `200` means both the
//! process and its database are up.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode};
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::models::{AppState, HealthCheck};
use crate::services::metrics::names;
use crate::utils::deadline::within;

/// Liveness check backed by a database insert.
///
/// GET /healthz
///
/// Requests are validated by [`reject_client_input`](crate::middleware::reject_client_input)
/// before reaching this handler. Cache-suppressing headers are added by a
/// layer on the route for every response, including errors.
///
/// # Returns
///
/// - `200 OK` - A health check row was written
/// - `400 Bad Request` - Query string, body or auth header present (middleware)
/// - `503 Service Unavailable` - The insert failed or timed out
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn health_check(State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    let started = Instant::now();

    let db_started = Instant::now();
    let result = within(
        state.external_call_timeout,
        HealthCheck::record(&state.db_pool),
    )
    .await;
    state
        .metrics
        .timing(names::HEALTHZ_DB_INSERT_DURATION, db_started.elapsed());

    let record = result.map_err(|e| {
        e.log("health_check_insert");
        state.metrics.increment(names::HEALTHZ_ERROR);
        AppError::Unavailable("Health check insert failed")
    })?;

    state.metrics.increment(names::HEALTHZ_COUNT);
    state
        .metrics
        .timing(names::HEALTHZ_DURATION, started.elapsed());
    debug!(check_id = record.check_id, "Health check passed");

    Ok(StatusCode::OK)
}
