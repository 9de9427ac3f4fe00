//! Cache records reported by the cache service and their usage totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One accounted unit of build-cache storage.
///
/// Only `id` is required on the wire; the remaining fields default when the
/// cache service omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Record identifier.
    pub id: String,
    /// Still being written.
    #[serde(default)]
    pub mutable: bool,
    /// Currently referenced or pinned.
    #[serde(default)]
    pub in_use: bool,
    /// Size in bytes. Zero or negative sizes are metadata-only.
    #[serde(default)]
    pub size: i64,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Parent record, if layered on another record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// When the record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    /// How many times the record was used.
    #[serde(default)]
    pub usage_count: u64,
    /// Record type (for example `regular`, `source.local`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    /// Shared with other records.
    #[serde(default)]
    pub shared: bool,
}

impl CacheRecord {
    /// Creates a record with the given identifier and size.
    #[must_use]
    pub fn new(id: impl Into<String>, size: i64) -> Self {
        Self {
            id: id.into(),
            size,
            ..Self::default()
        }
    }

    /// Marks the record as mutable.
    #[must_use]
    pub const fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Marks the record as in use.
    #[must_use]
    pub const fn with_in_use(mut self, in_use: bool) -> Self {
        self.in_use = in_use;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Not in use, hence eligible for deletion.
    #[must_use]
    pub const fn is_reclaimable(&self) -> bool {
        !self.in_use
    }

    /// Whether the record's size counts toward usage totals.
    #[must_use]
    pub const fn has_storage(&self) -> bool {
        self.size > 0
    }
}

/// Reclaimable and total bytes over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    /// Sum of positive sizes.
    pub total_bytes: i64,
    /// Sum of positive sizes of records not in use.
    pub reclaimable_bytes: i64,
}
