//! Usage totals over cache records.

use crate::models::{CacheRecord, UsageSummary};

/// Totals reclaimable and used bytes.
///
/// Records with a size of zero or less are metadata-only and count toward
/// neither total. The result does not depend on record order.
#[must_use]
pub fn summarize_usage(records: &[CacheRecord]) -> UsageSummary {
    records
        .iter()
        .filter(|record| record.has_storage())
        .fold(UsageSummary::default(), |mut summary, record| {
            summary.total_bytes = summary.total_bytes.saturating_add(record.size);
            if record.is_reclaimable() {
                summary.reclaimable_bytes = summary.reclaimable_bytes.saturating_add(record.size);
            }
            summary
        })
}
