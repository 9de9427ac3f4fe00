//! Prune report: table or debug dump, then the usage summary.

use super::units::{human_duration, human_size, precise_size};
use crate::gc::summarize_usage;
use crate::models::{CacheRecord, UsageSummary};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::io::{self, Write};

/// Descriptions longer than this many characters are truncated.
pub const DESCRIPTION_LIMIT: usize = 50;

/// Appended to the id of mutable records.
pub const MUTABLE_MARKER: char = '*';

const ELLIPSIS: &str = "...";
const COLUMN_GAP: &str = "  ";
const TABLE_HEADER: [&str; 4] = ["ID", "RECLAIMABLE", "SIZE", "DESCRIPTION"];

/// How records are rendered before the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Table, one row per record.
    #[default]
    Table,
    /// Every known field of every record.
    Debug,
}

/// Writes the prune report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    mode: ReportMode,
}

impl Reporter {
    /// Creates a reporter; `debug` selects the raw dump over the table.
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self {
            mode: if debug {
                ReportMode::Debug
            } else {
                ReportMode::Table
            },
        }
    }

    /// Selected mode.
    #[must_use]
    pub const fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Writes records and summary, returning the summary.
    ///
    /// The summary always covers every record, whatever the table shows.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_report<W: Write>(
        &self,
        writer: &mut W,
        records: &[CacheRecord],
    ) -> io::Result<UsageSummary> {
        match self.mode {
            ReportMode::Table => write_table(writer, records)?,
            ReportMode::Debug => write_debug(writer, records, Utc::now())?,
        }

        let summary = summarize_usage(records);
        write_summary(writer, &summary)?;
        Ok(summary)
    }
}

/// Id as shown in the table, with [`MUTABLE_MARKER`] for mutable records.
#[must_use]
pub fn display_id(record: &CacheRecord) -> Cow<'_, str> {
    if record.mutable {
        Cow::Owned(format!("{}{MUTABLE_MARKER}", record.id))
    } else {
        Cow::Borrowed(&record.id)
    }
}

/// Cuts descriptions longer than [`DESCRIPTION_LIMIT`] characters and
/// appends `...`.
///
/// Counts characters rather than bytes so multi-byte text is never split.
#[must_use]
pub fn truncate_description(description: &str) -> Cow<'_, str> {
    match description.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &description[..cut])),
        None => Cow::Borrowed(description),
    }
}

/// Writes the header and one row per record in the given order.
///
/// Cells are separated by two spaces; rows are not re-sorted.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(writer: &mut W, records: &[CacheRecord]) -> io::Result<()> {
    writeln!(writer, "{}", TABLE_HEADER.join(COLUMN_GAP))?;
    for record in records {
        writeln!(
            writer,
            "{id}{COLUMN_GAP}{reclaimable}{COLUMN_GAP}{size}{COLUMN_GAP}{description}",
            id = display_id(record),
            reclaimable = record.is_reclaimable(),
            size = human_size(record.size),
            description = truncate_description(&record.description),
        )?;
    }
    Ok(())
}

/// Writes every known field of every record as `Key: value` lines.
///
/// `now` anchors the "Last used" age.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_debug<W: Write>(
    writer: &mut W,
    records: &[CacheRecord],
    now: DateTime<Utc>,
) -> io::Result<()> {
    for record in records {
        write_field(writer, "ID", &record.id)?;
        if let Some(parent) = &record.parent {
            write_field(writer, "Parent", parent)?;
        }
        if let Some(created_at) = record.created_at {
            write_field(writer, "Created at", created_at.to_rfc3339())?;
        }
        write_field(writer, "Mutable", record.mutable)?;
        write_field(writer, "Reclaimable", record.is_reclaimable())?;
        write_field(writer, "Shared", record.shared)?;
        write_field(writer, "Size", precise_size(record.size))?;
        if !record.description.is_empty() {
            write_field(writer, "Description", &record.description)?;
        }
        write_field(writer, "Usage count", record.usage_count)?;
        if let Some(last_used_at) = record.last_used_at {
            let elapsed = (now - last_used_at).to_std().unwrap_or_default();
            write_field(writer, "Last used", format!("{} ago", human_duration(elapsed)))?;
        }
        if let Some(record_type) = &record.record_type {
            write_field(writer, "Type", record_type)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_field<W: Write>(
    writer: &mut W,
    key: &str,
    value: impl std::fmt::Display,
) -> io::Result<()> {
    writeln!(writer, "{:<14}{value}", format!("{key}:"))
}

/// Writes the two-line reclaimed/total summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(writer: &mut W, summary: &UsageSummary) -> io::Result<()> {
    writeln!(writer, "Reclaimed: {}", human_size(summary.reclaimable_bytes))?;
    writeln!(writer, "Total: {}", human_size(summary.total_bytes))
}
