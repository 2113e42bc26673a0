//! # Middleware Components
//!
//! Middleware functions handling cross-cutting request checks.

pub mod validation;

pub use validation::{reject_client_input, reject_query_and_auth};
