//! # Centralized Error Handling
//!
//! This module provides the error types shared by the handlers and the
//! mapping from those errors to HTTP responses. Every error response has an
//! empty body: the reason is logged here and never sent to the client.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::services::blob_store::BlobStoreError;

/// Request-boundary error type.
///
/// Handlers decide which variant a downstream failure becomes, since the
/// same failure maps to different statuses depending on the operation
/// (a database error is `503` on upload but `404` on lookup).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    /// The path exists but does not support the method. Carries the value
    /// of the `Allow` header, if the route advertises one.
    #[error("method not allowed")]
    MethodNotAllowed(Option<&'static str>),

    #[error("service unavailable: {0}")]
    Unavailable(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(reason) => {
                debug!(reason, "Rejecting malformed request");
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(reason) => {
                debug!(reason, "Resource not found");
                StatusCode::NOT_FOUND
            }
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unavailable(reason) => {
                warn!(reason, "Backend unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let mut response = status.into_response();
        if let AppError::MethodNotAllowed(Some(allow)) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;

/// Failure of a call to one of the external collaborators.
///
/// Call [`ExternalError::log`] before collapsing one into an [`AppError`],
/// which carries no detail.
#[derive(Error, Debug)]
pub enum ExternalError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("blob store error: {0}")]
    Blob(#[from] BlobStoreError),

    #[error("external call timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

impl ExternalError {
    /// Logs the failure with the step that produced it.
    pub fn log(&self, step: &'static str) {
        match self {
            ExternalError::Db(e) => error!(step, error = ?e, "Database error occurred"),
            ExternalError::Blob(e) => error!(step, error = %e, "Blob store error occurred"),
            ExternalError::TimedOut(after) => {
                error!(step, ?after, "External call timed out")
            }
        }
    }
}
