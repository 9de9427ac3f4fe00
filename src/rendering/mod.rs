//! Report rendering.
//!
//! Turns the records returned by a prune into the text written to stdout:
//! either a two-space-separated table or a per-record debug dump, always
//! followed by the reclaimed/total summary.

mod report;
mod units;

pub use report::{
    DESCRIPTION_LIMIT, MUTABLE_MARKER, ReportMode, Reporter, display_id, truncate_description,
    write_debug, write_summary, write_table,
};
pub use units::{human_duration, human_size, precise_size};
