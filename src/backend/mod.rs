//! Cache service backends.
//!
//! The garbage collector that decides what is deletable lives in an
//! external cache service. This module defines the seam the prune
//! executor talks through: a [`BackendConnector`] acquires a
//! [`CacheBackend`] handle, the handle performs one prune, and
//! [`CacheBackend::close`] releases it.

mod http;

pub use http::{HttpBackend, HttpConnector, NAMESPACE_HEADER, SESSION_HEADER, decode_records};

use crate::Result;
use crate::models::{CacheRecord, PruneRequest};
use crate::observability::SessionContext;
use std::future::Future;

/// Handle to a connected cache service.
///
/// Implementations must return the complete record collection from
/// [`CacheBackend::prune`]; streaming transports accumulate before returning.
pub trait CacheBackend: Send + Sync {
    /// Asks the cache service to prune and returns the affected records.
    ///
    /// Rejections by the service (for example a malformed filter) are
    /// reported as [`crate::Error::Request`].
    fn prune(
        &self,
        session: &SessionContext,
        request: &PruneRequest,
    ) -> impl Future<Output = Result<Vec<CacheRecord>>> + Send;

    /// Releases the handle.
    fn close(self);
}

/// Acquires cache service handles.
pub trait BackendConnector: Send + Sync {
    /// Handle type produced by this connector.
    type Backend: CacheBackend;

    /// Establishes a handle for `session`.
    ///
    /// Failures are reported as [`crate::Error::Connection`].
    fn connect(
        &self,
        session: &SessionContext,
    ) -> impl Future<Output = Result<Self::Backend>> + Send;

    /// Human-readable location of the cache service, for logs.
    fn location(&self) -> &str;
}
