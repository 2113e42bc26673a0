//! # External Services
//!
//! Handles to the collaborators the handlers call out to. Each service is a
//! trait so the application state can hold either a production client or an
//! in-process implementation.
//!
//! ## Available Services
//!
//! - **Blob store** (`blob_store`) - Object storage for uploaded file content
//! - **Metrics** (`metrics`) - Counter and timing sink

pub mod blob_store;
pub mod metrics;
