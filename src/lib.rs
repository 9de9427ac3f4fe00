//! # Buildprune
//!
//! Prune and clean up the build cache of a container image builder.
//!
//! Buildprune turns retention constraints (age, storage budget, filter
//! predicates, internal references) into a single prune request for the
//! cache service, then reports which cache records were affected and how
//! many bytes were reclaimed.
//!
//! ## Pipeline
//!
//! - [`models::FilterSet`] and [`models::RetentionPolicy`] collect the options
//! - [`gc::PruneExecutor`] calls the cache service inside a fresh session
//! - [`gc::summarize_usage`] totals reclaimable and used bytes
//! - [`rendering::Reporter`] prints the table (or debug dump) and summary
//!
//! ## Example
//!
//! ```rust,ignore
//! use buildprune::backend::HttpConnector;
//! use buildprune::gc::{PruneExecutor, cancellation_signal};
//! use buildprune::models::RetentionPolicy;
//! use buildprune::rendering::Reporter;
//!
//! let executor = PruneExecutor::new(HttpConnector::new("http://127.0.0.1:8235"));
//! let policy = RetentionPolicy::new().with_keep_storage_mb(512.0)?;
//! let records = executor.execute(policy, cancellation_signal(None)).await?;
//! Reporter::new(false).write_report(&mut std::io::stdout(), &records)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod backend;
pub mod cli;
pub mod config;
pub mod gc;
pub mod models;
pub mod observability;
pub mod rendering;

// Re-exports for convenience
pub use config::PruneConfig;
pub use gc::{CancelReason, PruneExecutor, summarize_usage};
pub use models::{CacheRecord, FilterSet, PruneRequest, RetentionPolicy, UsageSummary};
pub use rendering::Reporter;

/// Error type for buildprune operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Negative or non-finite storage budget, malformed duration, empty filter |
/// | `Connection` | Cache service endpoint is invalid or unreachable |
/// | `Request` | Cache service rejects the prune or returns an unreadable reply |
/// | `Cancelled` | Interrupt signal or deadline fires while waiting on the cache service |
/// | `OperationFailed` | Config file I/O, logging init, writing the report |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised before the cache service is contacted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The cache service handle could not be established.
    ///
    /// Raised when:
    /// - The configured endpoint is not a valid URL
    /// - The HTTP client cannot be built
    /// - The liveness probe fails or returns a non-success status
    #[error("cannot reach cache service at {endpoint}: {cause}")]
    Connection {
        /// The endpoint that was contacted.
        endpoint: String,
        /// The underlying cause.
        cause: String,
    },

    /// The cache service rejected the prune request.
    ///
    /// Carries the service's message verbatim (for example an invalid
    /// filter predicate).
    #[error("prune request failed: {0}")]
    Request(String),

    /// The prune was cancelled before the cache service replied.
    #[error("prune cancelled: {reason}")]
    Cancelled {
        /// Why the wait was abandoned.
        reason: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - The configuration file cannot be read or parsed
    /// - Logging cannot be initialized
    /// - The report cannot be written
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Input errors share clap's usage exit code; cancellation uses the
    /// conventional interrupted status.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Cancelled { .. } => 130,
            Self::Connection { .. } | Self::Request(_) | Self::OperationFailed { .. } => 1,
        }
    }
}

/// Result type alias for buildprune operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::Request("invalid filter \"foo\"".to_string());
        assert_eq!(
            err.to_string(),
            "prune request failed: invalid filter \"foo\""
        );

        let err = Error::Connection {
            endpoint: "http://localhost:1".to_string(),
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot reach cache service at http://localhost:1: connection refused"
        );
    }

    #[test]
    fn test_exit_codes_distinguish_cancellation() {
        let cancelled = Error::Cancelled {
            reason: "interrupted".to_string(),
        };
        let rejected = Error::Request("bad filter".to_string());

        assert_eq!(cancelled.exit_code(), 130);
        assert_eq!(rejected.exit_code(), 1);
        assert_eq!(Error::InvalidInput(String::new()).exit_code(), 2);
        assert_ne!(cancelled.exit_code(), 0);
    }
}
