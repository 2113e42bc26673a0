//! # File Handlers
//!
//! Upload, lookup and deletion of image files. Content goes to the blob
//! store and a metadata row goes to the `files` table. The two writes are
//! ordered but not atomic:
//!
//! 1. Upload writes the blob first, then the record. If the record insert
//!    fails the blob is left behind.
//! 2. Delete removes the blob first, then the record. If the record delete
//!    fails the record points at a missing blob.
//!
//! Neither case is compensated.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{
        Multipart, Path, State, multipart::MultipartRejection, rejection::PathRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{Span, debug, field, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ExternalError};
use crate::models::{AppState, FileRecord};
use crate::services::metrics::names;
use crate::utils::{
    constant::UPLOAD_FIELD_NAME,
    deadline::within,
    upload::{ImageUploadValidator, StorageLocator},
};

/// The single file part accepted by [`upload_file`].
#[derive(Debug)]
struct UploadedImage {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Uploads an image file.
///
/// POST /v1/file MultipartForm
///
/// Accepts exactly one file part under the `profilePic` field. Non-file
/// fields are ignored.
///
/// # Validation
///
/// - No query parameters or auth headers (middleware)
/// - Content-Type of the part must be image/*
/// - Size must not exceed 5 MiB
/// - Exactly one file part, under the expected field name
///
/// # Storage
///
/// The blob is stored under `{id}/{random uuid}{ext}` and the record's
/// `url` is `{bucket}/{key}`. Identical uploads produce distinct records.
///
/// # Returns
///
/// - `201 Created` with [`FileRecord`] - File stored
/// - `400 Bad Request` - Any validation failure
/// - `503 Service Unavailable` - Blob store or database failure
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let started = Instant::now();

    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Request is not a multipart form");
        AppError::BadRequest("Multipart form required")
    })?;
    let upload = read_upload(&mut multipart).await?;

    let id = Uuid::new_v4();
    let key = StorageLocator::generate_key(id, &upload.file_name);
    let size = upload.data.len();
    debug!(file_id = %id, key = %key, size, "Storing uploaded file");

    let blob_started = Instant::now();
    let put = within(
        state.external_call_timeout,
        state
            .blob_store
            .put(&key, upload.data, &upload.content_type),
    )
    .await;
    state
        .metrics
        .timing(names::FILE_S3_UPLOAD_DURATION, blob_started.elapsed());
    put.map_err(|e| upload_failed(&state, e, "blob_put"))?;

    let record = FileRecord {
        file_name: upload.file_name,
        id,
        url: StorageLocator::locator(state.blob_store.location(), &key),
        upload_date: OffsetDateTime::now_utc().date(),
    };

    let db_started = Instant::now();
    let inserted = within(state.external_call_timeout, record.insert(&state.db_pool)).await;
    state
        .metrics
        .timing(names::FILE_DB_CREATE_DURATION, db_started.elapsed());
    let stored = inserted.map_err(|e| {
        warn!(key = %key, "Blob left without a file record");
        upload_failed(&state, e, "record_insert")
    })?;

    state.metrics.increment(names::FILE_UPLOAD_COUNT);
    state
        .metrics
        .timing(names::FILE_UPLOAD_DURATION, started.elapsed());
    info!(file_id = %stored.id, size, "File uploaded");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Retrieves the metadata of a file.
///
/// GET /v1/file/{id}
///
/// # Returns
///
/// - `200 OK` with [`FileRecord`] - Record found
/// - `400 Bad Request` - Query string, body or auth header present (middleware)
/// - `404 Not Found` - No such record, malformed id, or the lookup failed
#[instrument(skip_all, fields(request_id = %Uuid::new_v4(), file_id = field::Empty))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<FileRecord>> {
    let started = Instant::now();
    let id = parse_file_id(id)?;

    let record = lookup(&state, id)
        .await
        .map_err(|e| {
            e.log("record_lookup");
            AppError::NotFound("File lookup failed")
        })?
        .ok_or(AppError::NotFound("File not found"))?;

    state
        .metrics
        .timing(names::FILE_GET_DURATION, started.elapsed());
    debug!("File record returned");

    Ok(Json(record))
}

/// Deletes a file and its blob.
///
/// DELETE /v1/file/{id}
///
/// The blob is removed before the record. Any failure in the sequence is
/// reported as not found, the same as a missing record.
///
/// # Returns
///
/// - `204 No Content` - Blob and record removed
/// - `404 Not Found` - No such record, or any step failed
#[instrument(skip_all, fields(request_id = %Uuid::new_v4(), file_id = field::Empty))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<StatusCode> {
    let started = Instant::now();
    let id = parse_file_id(id)?;

    let record = lookup(&state, id)
        .await
        .map_err(|e| delete_failed(&state, e, "record_lookup"))?
        .ok_or(AppError::NotFound("File not found"))?;
    let key = StorageLocator::key_from_locator(state.blob_store.location(), &record.url);

    let blob_started = Instant::now();
    let deleted = within(state.external_call_timeout, state.blob_store.delete(key)).await;
    state
        .metrics
        .timing(names::FILE_S3_DELETE_DURATION, blob_started.elapsed());
    deleted.map_err(|e| delete_failed(&state, e, "blob_delete"))?;

    within(state.external_call_timeout, record.destroy(&state.db_pool))
        .await
        .map_err(|e| {
            warn!(key = %key, "File record left without a blob");
            delete_failed(&state, e, "record_delete")
        })?;

    state.metrics.increment(names::FILE_DELETE_COUNT);
    state
        .metrics
        .timing(names::FILE_DELETE_DURATION, started.elapsed());
    info!("File deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Reads the multipart form and returns its single image part.
async fn read_upload(multipart: &mut Multipart) -> AppResult<UploadedImage> {
    let mut upload: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Error reading multipart form");
        AppError::BadRequest("Invalid multipart data")
    })? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            trace!(field_name = ?field.name(), "Ignoring non-file field");
            continue;
        };

        if field.name() != Some(UPLOAD_FIELD_NAME) {
            warn!(field_name = ?field.name(), "File sent under unexpected field");
            return Err(AppError::BadRequest("Unexpected file field"));
        }

        if upload.is_some() {
            warn!("More than one file in multipart form");
            return Err(AppError::BadRequest("Only one file may be uploaded"));
        }

        let content_type = field.content_type().map(str::to_owned);
        ImageUploadValidator::validate_content_type(content_type.as_deref()).map_err(|e| {
            warn!(content_type = ?content_type, error = %e, "Invalid content type");
            AppError::BadRequest(e)
        })?;

        let data = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Error reading file data");
            AppError::BadRequest("Error reading file")
        })?;

        ImageUploadValidator::validate_size(&data).map_err(|e| {
            warn!(size = data.len(), error = %e, "File too large");
            AppError::BadRequest(e)
        })?;

        upload = Some(UploadedImage {
            file_name,
            content_type: content_type.unwrap_or_default(),
            data,
        });
    }

    upload.ok_or_else(|| {
        warn!("No file provided in multipart form");
        AppError::BadRequest("No file provided")
    })
}

/// Fetches a record by id, timing the query.
async fn lookup(state: &AppState, id: Uuid) -> Result<Option<FileRecord>, ExternalError> {
    let db_started = Instant::now();
    let found = within(
        state.external_call_timeout,
        FileRecord::find(&state.db_pool, id),
    )
    .await;
    state
        .metrics
        .timing(names::FILE_DB_QUERY_DURATION, db_started.elapsed());

    found
}

/// Any id that is not a UUID, including a path segment that does not
/// decode, is reported as not found.
fn parse_file_id(raw: Result<Path<String>, PathRejection>) -> AppResult<Uuid> {
    let Path(raw) = raw.map_err(|e| {
        debug!(error = %e, "Undecodable file id");
        AppError::NotFound("Malformed file id")
    })?;

    let id = Uuid::try_parse(&raw).map_err(|_| {
        debug!(raw, "Malformed file id");
        AppError::NotFound("Malformed file id")
    })?;
    Span::current().record("file_id", field::display(id));
    Ok(id)
}

fn upload_failed(state: &AppState, e: ExternalError, step: &'static str) -> AppError {
    e.log(step);
    state.metrics.increment(names::FILE_UPLOAD_ERROR);
    AppError::Unavailable("File upload failed")
}

fn delete_failed(state: &AppState, e: ExternalError, step: &'static str) -> AppError {
    e.log(step);
    state.metrics.increment(names::FILE_DELETE_ERROR);
    AppError::NotFound("File delete failed")
}
