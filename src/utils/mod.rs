//! # Utility Modules
//!
//! This module contains utility functions and constants used throughout the
//! application.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide limits, timeouts and header values
//! - **Deadline** (`deadline`) - Timeouts for calls to external collaborators
//! - **Upload** (`upload`) - Upload validation and blob key derivation

pub mod constant;
pub mod deadline;
pub mod upload;
