//! # Health Check Records
//!
//! Append-only log of successful liveness checks. Rows are written by
//! `GET /healthz` and never read back by the service.

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{instrument, trace};

/// A row of the `health_checks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HealthCheck {
    /// Monotonically assigned by the database
    pub check_id: i64,
    /// Time of insert, assigned by the database
    pub datetime: OffsetDateTime,
}

impl HealthCheck {
    /// Inserts a new health check row and returns it.
    #[instrument(skip_all)]
    pub async fn record(db_pool: &PgPool) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, HealthCheck>(
            "INSERT INTO health_checks DEFAULT VALUES RETURNING check_id, datetime",
        )
        .fetch_one(db_pool)
        .await?;

        trace!(check_id = row.check_id, "Health check recorded");
        Ok(row)
    }
}
