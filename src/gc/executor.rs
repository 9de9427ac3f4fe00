//! Prune executor.

use super::CancelReason;
use crate::backend::{BackendConnector, CacheBackend};
use crate::models::{CacheRecord, PruneRequest, RetentionPolicy};
use crate::observability::{DEFAULT_NAMESPACE, SessionContext};
use crate::{Error, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info, info_span, warn};

/// Safely converts Duration to milliseconds as u64, capping at `u64::MAX`.
#[inline]
fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Converts usize to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn usize_to_f64(value: usize) -> f64 {
    let capped = u32::try_from(value).unwrap_or(u32::MAX);
    f64::from(capped)
}

/// Converts u64 to f64 for metrics, capping at `u32::MAX`.
#[inline]
fn u64_to_f64(value: u64) -> f64 {
    let capped = u32::try_from(value).unwrap_or(u32::MAX);
    f64::from(capped)
}

/// Runs a single prune against the cache service.
///
/// Each call to [`PruneExecutor::execute`] gets its own session, so
/// concurrent executions never share state here.
pub struct PruneExecutor<C> {
    connector: C,
    namespace: String,
}

impl<C: BackendConnector> PruneExecutor<C> {
    /// Creates an executor using the default namespace.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Sets the namespace label sent with every call.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Prunes according to `policy` and returns every affected record.
    ///
    /// Stops waiting as soon as `cancel` resolves. The backend handle, once
    /// acquired, is released exactly once whether the prune succeeds, fails
    /// or is cancelled.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if no handle can be acquired
    /// - [`Error::Request`] if the cache service rejects the prune
    /// - [`Error::Cancelled`] if `cancel` resolves first
    pub async fn execute<F>(&self, policy: RetentionPolicy, cancel: F) -> Result<Vec<CacheRecord>>
    where
        F: Future<Output = CancelReason>,
    {
        let session = SessionContext::new(self.namespace.clone());
        let span = info_span!(
            "buildprune.prune",
            session_id = %session.session_id(),
            namespace = %session.namespace(),
            backend = %self.connector.location(),
            all = policy.include_internal(),
            filters = policy.filters().len(),
            keep_duration = ?policy.keep_duration(),
            keep_storage_mb = policy.keep_storage_mb()
        );
        if policy.filters().is_empty() {
            debug!(parent: &span, "No filter predicates, every eligible record is a candidate");
        }
        let request = policy.into_request();

        self.run(session, request, cancel).instrument(span).await
    }

    async fn run<F>(
        &self,
        session: SessionContext,
        request: PruneRequest,
        cancel: F,
    ) -> Result<Vec<CacheRecord>>
    where
        F: Future<Output = CancelReason>,
    {
        let start = Instant::now();
        let mut cancel = std::pin::pin!(cancel);

        let backend = tokio::select! {
            biased;
            reason = &mut cancel => {
                record_outcome("cancelled", start);
                warn!(%reason, "Prune cancelled before the cache service was reached");
                return Err(cancelled(reason));
            },
            connected = self.connector.connect(&session) => match connected {
                Ok(backend) => backend,
                Err(e) => {
                    record_outcome("connection_error", start);
                    return Err(e);
                },
            },
        };

        debug!("Sending prune request");
        let outcome = tokio::select! {
            biased;
            reason = &mut cancel => Err(cancelled(reason)),
            result = backend.prune(&session, &request) => result,
        };
        backend.close();

        match &outcome {
            Ok(records) => {
                record_outcome("success", start);
                metrics::gauge!("prune_records_returned").set(usize_to_f64(records.len()));
                info!(
                    records = records.len(),
                    duration_ms = duration_to_millis(start.elapsed()),
                    "Prune completed"
                );
            },
            Err(e @ Error::Cancelled { .. }) => {
                record_outcome("cancelled", start);
                warn!(error = %e, "Prune cancelled while waiting on the cache service");
            },
            Err(e) => {
                record_outcome("request_error", start);
                warn!(error = %e, "Prune failed");
            },
        }

        outcome
    }
}

fn cancelled(reason: CancelReason) -> Error {
    Error::Cancelled {
        reason: reason.to_string(),
    }
}

fn record_outcome(outcome: &'static str, start: Instant) {
    metrics::counter!("prune_runs_total", "outcome" => outcome).increment(1);
    metrics::histogram!("prune_duration_ms").record(u64_to_f64(duration_to_millis(start.elapsed())));
}
