//! Filevault Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! upload validation shared by all filevault components. It contains no
//! network code.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::ClientError;
pub use validation::{validate_batch, RejectReason, RejectedFile, UploadLimits, ValidationOutcome};
