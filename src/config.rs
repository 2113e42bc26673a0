//! # Configuration
//!
//! Runtime configuration read from environment variables (after `.env` has
//! been loaded by `dotenvy` in `main`).
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL` - PostgreSQL connection URL (required)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size, defaults to 10
//! - `BLOB_STORE` - `s3` (default) or `memory`
//! - `S3_BUCKET` - Bucket for uploaded files, required when `BLOB_STORE=s3`
//! - `AWS_REGION` - Region of the bucket, defaults to `us-east-1`
//! - `BIND_ADDR` - Listen address, defaults to `0.0.0.0:8080`
//! - `APP_ENV` - `production` enables JSON logs
//! - `LOG_FILE` - Optional path JSON logs are also appended to
//! - `METRICS_ADDR` - Optional listen address for the Prometheus exporter
//! - `EXTERNAL_CALL_TIMEOUT_SECS` - Deadline per external call, clamped to 5-30, defaults to 10

use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use thiserror::Error;
use tracing::warn;

use crate::utils::constant::{
    DEFAULT_EXTERNAL_CALL_TIMEOUT, MAX_EXTERNAL_CALL_TIMEOUT, MIN_EXTERNAL_CALL_TIMEOUT,
};

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("env variable `{0}` should be set")]
    Missing(&'static str),

    #[error("env variable `{key}` has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
}

impl AppEnv {
    /// Reads `APP_ENV` from the process environment.
    pub fn from_env() -> Self {
        Self::parse(env::var("APP_ENV").ok())
    }

    fn parse(raw: Option<String>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("production") => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }
}

/// Reads `LOG_FILE` from the process environment. Unset or empty means
/// no log file.
pub fn log_file_from_env() -> Option<PathBuf> {
    parse_log_file(env::var("LOG_FILE").ok())
}

fn parse_log_file(raw: Option<String>) -> Option<PathBuf> {
    raw.filter(|path| !path.trim().is_empty()).map(PathBuf::from)
}

/// Which blob store implementation to construct at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobStoreConfig {
    S3 { bucket: String, region: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub app_env: AppEnv,
    pub blob_store: BlobStoreConfig,
    pub metrics_addr: Option<SocketAddr>,
    pub external_call_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let metrics_addr = match lookup("METRICS_ADDR") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                key: "METRICS_ADDR",
                value: raw,
            })?),
            None => None,
        };

        let blob_store = match lookup("BLOB_STORE").as_deref() {
            None | Some("s3") => BlobStoreConfig::S3 {
                bucket: lookup("S3_BUCKET")
                    .filter(|bucket| !bucket.is_empty())
                    .ok_or(ConfigError::Missing("S3_BUCKET"))?,
                region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_owned()),
            },
            Some("memory") => BlobStoreConfig::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "BLOB_STORE",
                    value: other.to_owned(),
                });
            }
        };

        let timeout_secs = parse_or(
            &lookup,
            "EXTERNAL_CALL_TIMEOUT_SECS",
            DEFAULT_EXTERNAL_CALL_TIMEOUT.as_secs(),
        )?;
        let external_call_timeout = Duration::from_secs(timeout_secs)
            .clamp(MIN_EXTERNAL_CALL_TIMEOUT, MAX_EXTERNAL_CALL_TIMEOUT);
        if external_call_timeout.as_secs() != timeout_secs {
            warn!(
                requested = timeout_secs,
                applied = external_call_timeout.as_secs(),
                "EXTERNAL_CALL_TIMEOUT_SECS out of range, clamped"
            );
        }

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            app_env: AppEnv::parse(lookup("APP_ENV")),
            blob_store,
            metrics_addr,
            external_call_timeout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("S3_BUCKET", "uploads"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.metrics_addr, None);
        assert_eq!(config.external_call_timeout, Duration::from_secs(10));
        assert_eq!(
            config.blob_store,
            BlobStoreConfig::S3 {
                bucket: "uploads".into(),
                region: "us-east-1".into()
            }
        );
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup_from(&[("S3_BUCKET", "uploads")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn s3_requires_bucket() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("S3_BUCKET"));
    }

    #[test]
    fn memory_store_needs_no_bucket() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("BLOB_STORE", "memory"),
            ("APP_ENV", "Production"),
        ]))
        .unwrap();
        assert_eq!(config.blob_store, BlobStoreConfig::Memory);
        assert_eq!(config.app_env, AppEnv::Production);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("BLOB_STORE", "memory"),
            ("BIND_ADDR", "not-an-address"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "BIND_ADDR",
                value: "not-an-address".into()
            }
        );

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("BLOB_STORE", "ftp"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BLOB_STORE", .. }));
    }

    #[test]
    fn log_file_is_optional() {
        assert_eq!(parse_log_file(None), None);
        assert_eq!(parse_log_file(Some("  ".into())), None);
        assert_eq!(
            parse_log_file(Some("/var/log/webapp/webapp.log".into())),
            Some(PathBuf::from("/var/log/webapp/webapp.log"))
        );
    }

    #[test]
    fn timeout_is_clamped() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("BLOB_STORE", "memory"),
            ("EXTERNAL_CALL_TIMEOUT_SECS", "120"),
        ]))
        .unwrap();
        assert_eq!(config.external_call_timeout, Duration::from_secs(30));

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("BLOB_STORE", "memory"),
            ("EXTERNAL_CALL_TIMEOUT_SECS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.external_call_timeout, Duration::from_secs(5));
    }
}
