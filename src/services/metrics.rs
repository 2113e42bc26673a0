//! # Metrics Service
//!
//! Counters and timing samples emitted by the handlers. Recording is
//! fire-and-forget: a sink never returns an error and never influences the
//! response.
//!
//! ## Implementations
//!
//! - [`RecorderMetrics`] - Forwards to the global `metrics` recorder
//! - [`NoopMetrics`] - Discards everything

use std::time::Duration;

/// Trait for metric sinks
pub trait MetricsSink: Send + Sync {
    /// Increments the counter `name` by one.
    fn increment(&self, name: &'static str);

    /// Records a timing sample for `name`.
    fn timing(&self, name: &'static str, elapsed: Duration);
}

/// Sink backed by the `metrics` facade.
///
/// Counters become `metrics` counters and timings become histograms
/// measured in milliseconds. Without an installed recorder both are no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderMetrics;

impl MetricsSink for RecorderMetrics {
    fn increment(&self, name: &'static str) {
        ::metrics::counter!(name).increment(1);
    }

    fn timing(&self, name: &'static str, elapsed: Duration) {
        ::metrics::histogram!(name).record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// Sink that drops every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _name: &'static str) {}

    fn timing(&self, _name: &'static str, _elapsed: Duration) {}
}

/// Metric names, grouped by the endpoint that emits them.
pub mod names {
    pub const HEALTHZ_COUNT: &str = "api.healthz.count";
    pub const HEALTHZ_ERROR: &str = "api.healthz.error";
    pub const HEALTHZ_DB_INSERT_DURATION: &str = "api.healthz.db_insert_duration";
    pub const HEALTHZ_DURATION: &str = "api.healthz.duration";

    pub const FILE_S3_UPLOAD_DURATION: &str = "api.file.s3_upload_duration";
    pub const FILE_DB_CREATE_DURATION: &str = "api.file.db_create_duration";
    pub const FILE_UPLOAD_COUNT: &str = "api.file.upload.count";
    pub const FILE_UPLOAD_DURATION: &str = "api.file.upload.duration";
    pub const FILE_UPLOAD_ERROR: &str = "api.file.upload.error";

    pub const FILE_DB_QUERY_DURATION: &str = "api.file.db_query_duration";
    pub const FILE_GET_DURATION: &str = "api.file.get.duration";

    pub const FILE_S3_DELETE_DURATION: &str = "api.file.s3_delete_duration";
    pub const FILE_DELETE_COUNT: &str = "api.file.delete.count";
    pub const FILE_DELETE_DURATION: &str = "api.file.delete.duration";
    pub const FILE_DELETE_ERROR: &str = "api.file.delete.error";
}
