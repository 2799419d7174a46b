//! Types and helpers shared across the Zoolight crates.
//!
//! - [`observability`]: tracing/logging initialisation
//! - [`ZoolightError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use zoolight_common::ZoolightError;
//!
//! let err = ZoolightError::Dataset("connection refused".into());
//! assert_eq!(err.to_string(), "Dataset error: connection refused");
//! ```

pub mod observability;

/// Error types used across the Zoolight workspace.
#[derive(thiserror::Error, Debug)]
pub enum ZoolightError {
    /// The animal dataset could not be fetched or decoded.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`ZoolightError`].
pub type Result<T> = std::result::Result<T, ZoolightError>;
