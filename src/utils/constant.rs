//! # Application Constants
//!
//! This module defines configuration constants used throughout the application.
//! These constants control upload limits, timeouts, and fixed response headers.

use std::time::Duration;

/// Maximum accepted size of an uploaded file (5 MiB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Request body limit for the upload route
///
/// Leaves room for multipart boundaries and part headers on top of
/// [`MAX_UPLOAD_SIZE`]. Anything over the file limit is still rejected
/// by the handler itself.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_SIZE + 64 * 1024;

/// Multipart field name the uploaded image must be sent under
pub const UPLOAD_FIELD_NAME: &str = "profilePic";

/// Maximum number of body bytes buffered when checking that a request
/// carries no body. Larger bodies are rejected without being read in full.
pub const EMPTY_BODY_CHECK_LIMIT: usize = 64 * 1024;

/// Default deadline for a single call to the database or the blob store
pub const DEFAULT_EXTERNAL_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Lower bound accepted for the external call deadline
pub const MIN_EXTERNAL_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound accepted for the external call deadline
pub const MAX_EXTERNAL_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// `Cache-Control` value sent on every `/healthz` response
pub const NO_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// `Pragma` value sent on every `/healthz` response
pub const NO_CACHE_PRAGMA: &str = "no-cache";

/// `X-Content-Type-Options` value sent on every `/healthz` response
pub const CONTENT_TYPE_OPTIONS_NOSNIFF: &str = "nosniff";

/// Headers that count as client authentication and are refused on
/// parameterless endpoints
pub const AUTH_HEADER_NAMES: [&str; 2] = ["authentication", "authorization"];
