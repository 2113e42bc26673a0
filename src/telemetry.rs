//! # Tracing Setup
//!
//! Installs the global tracing subscriber. Production emits Bunyan-style
//! JSON lines for log shipping; other environments get the human-readable
//! formatter. When a log file is configured, JSON lines are appended to it
//! as well, whatever the environment.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
};

use tracing::warn;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppEnv;

const DEFAULT_FILTER: &str = "webapp=info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// A `log_file` that cannot be opened is reported once the subscriber is
/// up, and logging continues on stdout only.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_subscriber(app_env: AppEnv, log_file: Option<&Path>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file, file_error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer =
        file.map(|file| BunyanFormattingLayer::new(service_name(), Mutex::new(file)));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(file_layer);

    match app_env {
        AppEnv::Production => registry
            .with(BunyanFormattingLayer::new(service_name(), io::stdout))
            .init(),
        AppEnv::Development => registry.with(fmt::layer().with_target(true)).init(),
    }

    if let (Some(path), Some(e)) = (log_file, file_error) {
        warn!(
            path = %path.display(),
            error = %e,
            "Log file unavailable, logging to stdout only"
        );
    }
}

fn service_name() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

/// Opens `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
