//! Data models for buildprune.
//!
//! Retention options flow in through [`FilterSet`] and [`RetentionPolicy`],
//! leave as a [`PruneRequest`], and come back as [`CacheRecord`]s.

mod filter;
mod policy;
mod record;

pub use filter::FilterSet;
pub use policy::{BYTES_PER_MEGABYTE, PruneRequest, RetentionPolicy, megabytes_to_bytes};
pub use record::{CacheRecord, UsageSummary};
