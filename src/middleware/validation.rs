//! # Request Validation Middleware
//!
//! The liveness and lookup endpoints take no client input at all. Any query
//! string, body or authentication header on them is treated as misuse and
//! rejected with `400 Bad Request` before the handler runs.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{trace, warn};

use crate::error::AppError;
use crate::utils::constant::{AUTH_HEADER_NAMES, EMPTY_BODY_CHECK_LIMIT};

/// Rejects requests carrying a query string, a body or auth headers.
///
/// The body is buffered up to [`EMPTY_BODY_CHECK_LIMIT`] bytes to detect
/// bodies sent without a `Content-Length`. The request passed on to the
/// handler always has an empty body.
///
/// # Usage
///
/// ```rust,ignore
/// Router::new().route(
///     "/healthz",
///     get(health_check).route_layer(middleware::from_fn(reject_client_input)),
/// )
/// ```
pub async fn reject_client_input(req: Request, next: Next) -> Response {
    if let Err(e) = check_query_and_auth(&req) {
        return e.into_response();
    }

    if declared_content_length(req.headers()) > 0 {
        warn!("Rejecting request with declared body");
        return AppError::BadRequest("Request body not allowed").into_response();
    }

    let (parts, body) = req.into_parts();
    match to_bytes(body, EMPTY_BODY_CHECK_LIMIT).await {
        Ok(bytes) if bytes.is_empty() => {}
        Ok(_) => {
            warn!("Rejecting request with streamed body");
            return AppError::BadRequest("Request body not allowed").into_response();
        }
        Err(e) => {
            warn!(error = %e, "Rejecting request with unreadable body");
            return AppError::BadRequest("Request body not allowed").into_response();
        }
    }

    trace!("Request carries no client input");
    next.run(Request::from_parts(parts, Body::empty())).await
}

/// Rejects requests carrying a query string or auth headers.
///
/// Used where the body is the payload itself, such as the multipart upload.
pub async fn reject_query_and_auth(req: Request, next: Next) -> Response {
    if let Err(e) = check_query_and_auth(&req) {
        return e.into_response();
    }
    next.run(req).await
}

fn check_query_and_auth(req: &Request) -> Result<(), AppError> {
    if has_query(req.uri().query()) {
        warn!(query = ?req.uri().query(), "Rejecting request with query parameters");
        return Err(AppError::BadRequest("Query parameters not allowed"));
    }

    if has_auth_header(req.headers()) {
        warn!("Rejecting request with authentication header");
        return Err(AppError::BadRequest("Authentication headers not allowed"));
    }

    Ok(())
}

/// Returns true if the query string holds at least one parameter.
///
/// A bare `?` or a run of separators (`?&&`) carries no parameters.
fn has_query(query: Option<&str>) -> bool {
    query.is_some_and(|q| q.split('&').any(|pair| !pair.is_empty()))
}

fn has_auth_header(headers: &HeaderMap) -> bool {
    AUTH_HEADER_NAMES
        .iter()
        .any(|name| headers.contains_key(*name))
}

fn declared_content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}
