//! # HTTP Request Handlers
//!
//! Each handler processes one route and returns a fixed set of status
//! codes. Error responses have empty bodies.
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Liveness check backed by a database write
//! - **File** (`file`) - Image upload, lookup and deletion
//! - **Fallback** (`fallback`) - Unknown paths and unsupported methods

mod fallback;
mod file;
mod health_check;

pub use fallback::*;
pub use file::*;
pub use health_check::*;
