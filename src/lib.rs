//! # Webapp - Health Check and File Service
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven runtime configuration
//! - [`handlers`] - HTTP request handlers for the health and file endpoints
//! - [`middleware`] - Request validation applied ahead of the handlers
//! - [`models`] - Database records and shared application state
//! - [`services`] - Blob store and metrics collaborators
//! - [`telemetry`] - Tracing subscriber setup
//! - [`utils`] - Constants, deadlines and upload helpers

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, header},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::handlers::{
    delete_file, file_id_required, file_method_not_allowed, get_file, health_check,
    health_method_not_allowed, not_found, upload_file,
};
use crate::middleware::{reject_client_input, reject_query_and_auth};
use crate::models::AppState;
use crate::utils::constant::*;

/// Creates an Axum router with application routes and state.
///
/// # Routes
///
/// - `GET /healthz` - Liveness check; other methods return `405`
/// - `POST /v1/file` - Upload an image
/// - `GET|DELETE /v1/file/{id}` - Look up or delete a file
/// - `GET|DELETE /v1/file` - Always `400`, an identifier is required
/// - Any other path returns `404`
///
/// # Returns
///
/// A configured Axum router with all application routes and middleware
pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    let health_routes = Router::new()
        .route(
            "/healthz",
            get(health_check)
                .route_layer(from_fn(reject_client_input))
                .head(health_method_not_allowed)
                .fallback(health_method_not_allowed),
        )
        .layer(no_cache_header(header::CACHE_CONTROL, NO_CACHE_CONTROL))
        .layer(no_cache_header(header::PRAGMA, NO_CACHE_PRAGMA))
        .layer(no_cache_header(
            header::X_CONTENT_TYPE_OPTIONS,
            CONTENT_TYPE_OPTIONS_NOSNIFF,
        ));

    let file_collection_route = post(upload_file)
        .route_layer(from_fn(reject_query_and_auth))
        .route_layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .get(file_id_required)
        .delete(file_id_required)
        .head(file_method_not_allowed)
        .fallback(file_method_not_allowed);

    let file_item_route = get(get_file)
        .route_layer(from_fn(reject_client_input))
        .delete(delete_file)
        .head(file_method_not_allowed)
        .fallback(file_method_not_allowed);

    Router::new()
        .merge(health_routes)
        .route("/v1/file", file_collection_route)
        .route("/v1/file/{id}", file_item_route)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn no_cache_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
