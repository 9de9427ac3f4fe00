//! Retention policy and the prune request sent to the cache service.

use super::FilterSet;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decimal megabyte used by `--keep-storage` (not 2^20).
pub const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

/// Converts a megabyte budget to whole bytes, truncating any fraction.
///
/// Budgets beyond `i64::MAX` bytes saturate.
#[must_use]
pub fn megabytes_to_bytes(megabytes: f64) -> i64 {
    // Float-to-int `as` saturates at the bounds and maps NaN to 0.
    #[allow(clippy::cast_possible_truncation)]
    let bytes = (megabytes * BYTES_PER_MEGABYTE).trunc() as i64;
    bytes
}

/// Saturating conversion of a duration to the service's nanosecond unit.
fn duration_to_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

/// Retention constraints for one prune invocation.
///
/// Built once from parsed options and consumed by
/// [`RetentionPolicy::into_request`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionPolicy {
    keep_duration: Duration,
    keep_storage_mb: f64,
    include_internal: bool,
    filters: FilterSet,
}

impl RetentionPolicy {
    /// Creates a policy with no retention constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps records newer than `duration`. Zero disables age retention.
    #[must_use]
    pub const fn with_keep_duration(mut self, duration: Duration) -> Self {
        self.keep_duration = duration;
        self
    }

    /// Keeps up to `megabytes` of cache. Zero disables the size floor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for negative or non-finite budgets.
    pub fn with_keep_storage_mb(mut self, megabytes: f64) -> Result<Self> {
        if !megabytes.is_finite() || megabytes < 0.0 {
            return Err(Error::InvalidInput(format!(
                "keep-storage must be a non-negative number of megabytes, got {megabytes}"
            )));
        }
        self.keep_storage_mb = megabytes;
        Ok(self)
    }

    /// Includes internal/frontend references in the prune.
    #[must_use]
    pub const fn with_include_internal(mut self, include: bool) -> Self {
        self.include_internal = include;
        self
    }

    /// Sets the filter predicates.
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Age floor.
    #[must_use]
    pub const fn keep_duration(&self) -> Duration {
        self.keep_duration
    }

    /// Storage budget in decimal megabytes.
    #[must_use]
    pub const fn keep_storage_mb(&self) -> f64 {
        self.keep_storage_mb
    }

    /// Storage budget in bytes.
    #[must_use]
    pub fn keep_bytes(&self) -> i64 {
        megabytes_to_bytes(self.keep_storage_mb)
    }

    /// Whether internal references are included.
    #[must_use]
    pub const fn include_internal(&self) -> bool {
        self.include_internal
    }

    /// Filter predicates.
    #[must_use]
    pub const fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Builds the wire request, consuming the policy.
    #[must_use]
    pub fn into_request(self) -> PruneRequest {
        let keep_bytes = self.keep_bytes();
        PruneRequest {
            filters: self.filters.into_vec(),
            all: self.include_internal,
            keep_duration: duration_to_nanos(self.keep_duration),
            keep_bytes,
        }
    }
}

/// Prune request as consumed by the cache service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneRequest {
    /// Filter predicates, verbatim and in order.
    pub filters: Vec<String>,
    /// Include internal/frontend references.
    pub all: bool,
    /// Keep records newer than this many nanoseconds (0 = no age floor).
    pub keep_duration: i64,
    /// Keep up to this many bytes (0 = no size floor).
    pub keep_bytes: i64,
}
