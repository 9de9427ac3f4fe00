//! `prune` command.

use super::duration::{parse_duration, parse_storage_mb};
use crate::backend::{BackendConnector, HttpConnector};
use crate::config::PruneConfig;
use crate::gc::{CancelReason, PruneExecutor, cancellation_signal};
use crate::models::{FilterSet, RetentionPolicy, UsageSummary};
use crate::rendering::Reporter;
use crate::{Error, Result};
use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

/// Options for `buildprune prune`. Takes no positional arguments.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct PruneArgs {
    /// Keep data newer than this limit.
    #[arg(long, value_name = "DURATION", default_value = "0", value_parser = parse_duration)]
    pub keep_duration: Duration,

    /// Keep data below this limit (in MB).
    #[arg(
        long,
        value_name = "MB",
        default_value = "0",
        allow_negative_numbers = true,
        value_parser = parse_storage_mb
    )]
    pub keep_storage: f64,

    /// Filter based on conditions provided.
    #[arg(
        short,
        long = "filter",
        value_name = "EXPR",
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub filters: Vec<String>,

    /// Include internal/frontend references.
    #[arg(long)]
    pub all: bool,
}

impl PruneArgs {
    /// Builds the retention policy for these options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an invalid storage budget or an
    /// empty filter.
    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        let filters = FilterSet::from_values(self.filters.iter().cloned())?;
        Ok(RetentionPolicy::new()
            .with_keep_duration(self.keep_duration)
            .with_keep_storage_mb(self.keep_storage)?
            .with_include_internal(self.all)
            .with_filters(filters))
    }
}

/// Prunes and writes the report to `out`.
///
/// Nothing is written unless the prune completes; the report is rendered
/// in full before the first byte reaches `out`.
///
/// # Errors
///
/// Propagates executor errors; writing failures become
/// [`Error::OperationFailed`].
pub async fn prune<C, F, W>(
    args: &PruneArgs,
    executor: &PruneExecutor<C>,
    reporter: &Reporter,
    cancel: F,
    out: &mut W,
) -> Result<UsageSummary>
where
    C: BackendConnector,
    F: Future<Output = CancelReason>,
    W: Write,
{
    let policy = args.retention_policy()?;
    let records = executor.execute(policy, cancel).await?;

    let mut buffer = Vec::new();
    let summary = reporter
        .write_report(&mut buffer, &records)
        .map_err(write_error)?;
    out.write_all(&buffer)
        .and_then(|()| out.flush())
        .map_err(write_error)?;

    Ok(summary)
}

/// Runs `prune` against the configured cache service, reporting to stdout.
///
/// # Errors
///
/// See [`prune`].
pub async fn execute(args: &PruneArgs, config: &PruneConfig) -> Result<()> {
    let executor = PruneExecutor::new(HttpConnector::from_config(config))
        .with_namespace(config.namespace.clone());
    let reporter = Reporter::new(config.debug);
    let cancel = cancellation_signal(config.timeout());

    // Locked per write, never across the prune.
    prune(args, &executor, &reporter, cancel, &mut io::stdout()).await?;
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn write_error(e: io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_report".to_string(),
        cause: e.to_string(),
    }
}
