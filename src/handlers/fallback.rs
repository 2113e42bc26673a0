//! # Fallback Handlers
//!
//! Fixed responses for paths and methods the service does not serve.

use tracing::debug;

use crate::error::AppError;

/// Any path the router does not know.
pub async fn not_found() -> AppError {
    AppError::NotFound("No route for path")
}

/// Methods other than `GET` on `/healthz`.
pub async fn health_method_not_allowed() -> AppError {
    debug!("Unsupported method on health check");
    AppError::MethodNotAllowed(Some("GET"))
}

/// Undeclared methods on the file collection or a single file.
pub async fn file_method_not_allowed() -> AppError {
    debug!("Unsupported method on file route");
    AppError::MethodNotAllowed(None)
}

/// Collection-level operations that need an identifier.
///
/// `GET /v1/file` and `DELETE /v1/file`.
pub async fn file_id_required() -> AppError {
    AppError::BadRequest("File identifier required")
}
