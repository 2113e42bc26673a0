//! # File Records
//!
//! Metadata rows for uploaded files. Each record owns exactly one blob,
//! referenced by `url` (`"{bucket}/{key}"`). The record and its blob are
//! written and removed in two separate steps with no transaction spanning
//! both, so a failure between the steps leaves one without the other.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::Date;
use tracing::{instrument, trace};
use uuid::Uuid;

/// A row of the `files` table, also the JSON body returned by the file API.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct FileRecord {
    /// Original name of the uploaded file
    pub file_name: String,
    /// Identifier generated at upload time, the only lookup key
    pub id: Uuid,
    /// Locator of the blob, `"{bucket}/{key}"`
    pub url: String,
    /// Date of upload, serialized as `YYYY-MM-DD`
    pub upload_date: Date,
}

impl FileRecord {
    /// Inserts the record and returns the row as stored.
    #[instrument(skip_all, fields(file_id = %self.id))]
    pub async fn insert(&self, db_pool: &PgPool) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (id, file_name, url, upload_date)
            VALUES ($1, $2, $3, $4)
            RETURNING file_name, id, url, upload_date
            "#,
        )
        .bind(self.id)
        .bind(&self.file_name)
        .bind(&self.url)
        .bind(self.upload_date)
        .fetch_one(db_pool)
        .await?;

        trace!("File record inserted");
        Ok(row)
    }

    /// Looks up a record by identifier.
    ///
    /// Returns `Ok(None)` when no record exists; errors are reserved for
    /// failed queries.
    #[instrument(skip(db_pool))]
    pub async fn find(db_pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT file_name, id, url, upload_date FROM files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db_pool)
        .await
    }

    /// Deletes this record.
    ///
    /// # Errors
    ///
    /// Returns [`sqlx::Error::RowNotFound`] if the row was already gone.
    #[instrument(skip_all, fields(file_id = %self.id))]
    pub async fn destroy(&self, db_pool: &PgPool) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(self.id)
            .execute(db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        trace!("File record deleted");
        Ok(())
    }
}
