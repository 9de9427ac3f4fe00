//! End-to-end prune scenarios against in-process cache service fakes.
//!
//! Covers the report contract (table rows, summary lines, empty sets) and
//! the failure paths (connection, rejection, cancellation, usage errors).

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use buildprune::backend::{BackendConnector, CacheBackend};
use buildprune::cli::{Cli, Commands, PruneArgs};
use buildprune::gc::{CancelReason, cancellation_signal};
use buildprune::models::{CacheRecord, PruneRequest};
use buildprune::observability::SessionContext;
use buildprune::{Error, PruneExecutor, Reporter, Result};
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct Counters {
    connects: AtomicUsize,
    prunes: AtomicUsize,
    closes: AtomicUsize,
}

#[derive(Clone)]
enum Behavior {
    Reply(Vec<CacheRecord>),
    Reject(String),
    RefuseConnection,
    Stall(Arc<Notify>),
}

struct FakeConnector {
    behavior: Behavior,
    counters: Arc<Counters>,
}

struct FakeBackend {
    behavior: Behavior,
    counters: Arc<Counters>,
}

impl BackendConnector for FakeConnector {
    type Backend = FakeBackend;

    async fn connect(&self, _session: &SessionContext) -> Result<FakeBackend> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        if matches!(self.behavior, Behavior::RefuseConnection) {
            return Err(Error::Connection {
                endpoint: "fake://cache".to_string(),
                cause: "connection refused".to_string(),
            });
        }
        Ok(FakeBackend {
            behavior: self.behavior.clone(),
            counters: Arc::clone(&self.counters),
        })
    }

    fn location(&self) -> &str {
        "fake://cache"
    }
}

impl CacheBackend for FakeBackend {
    async fn prune(
        &self,
        _session: &SessionContext,
        _request: &PruneRequest,
    ) -> Result<Vec<CacheRecord>> {
        self.counters.prunes.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(records) => Ok(records.clone()),
            Behavior::Reject(message) => Err(Error::Request(message.clone())),
            Behavior::RefuseConnection => unreachable!("never connected"),
            Behavior::Stall(started) => {
                started.notify_one();
                std::future::pending().await
            },
        }
    }

    fn close(self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn executor(behavior: Behavior) -> (PruneExecutor<FakeConnector>, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let connector = FakeConnector {
        behavior,
        counters: Arc::clone(&counters),
    };
    (PruneExecutor::new(connector), counters)
}

fn default_args() -> PruneArgs {
    match Cli::try_parse_from(["buildprune", "prune"])
        .expect("no flags")
        .command
    {
        Commands::Prune(args) => args,
    }
}

async fn run_table<F>(behavior: Behavior, cancel: F) -> (Result<String>, Arc<Counters>)
where
    F: Future<Output = CancelReason>,
{
    let (executor, counters) = executor(behavior);
    let mut out = Vec::new();
    let result = buildprune::cli::prune::prune(
        &default_args(),
        &executor,
        &Reporter::new(false),
        cancel,
        &mut out,
    )
    .await
    .map(|_| String::from_utf8(out).expect("utf8"));
    (result, counters)
}

#[tokio::test]
async fn scenario_a_single_reclaimable_record() {
    let records = vec![CacheRecord::new("a", 1_000_000).with_description("x")];

    let (report, counters) = run_table(Behavior::Reply(records), std::future::pending()).await;
    let report = report.expect("prune succeeds");

    assert_eq!(
        report,
        "ID  RECLAIMABLE  SIZE  DESCRIPTION\n\
         a  true  1MB  x\n\
         Reclaimed: 1MB\n\
         Total: 1MB\n"
    );
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_b_mutable_record_in_use() {
    let records = vec![
        CacheRecord::new("b", 500_000)
            .with_mutable(true)
            .with_in_use(true)
            .with_description("y"),
    ];

    let (report, _) = run_table(Behavior::Reply(records), std::future::pending()).await;
    let report = report.expect("prune succeeds");
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[1], "b*  false  500kB  y");
    assert_eq!(lines[2], "Reclaimed: 0B");
    assert_eq!(lines[3], "Total: 500kB");
}

#[tokio::test]
async fn scenario_c_empty_record_set() {
    let (report, _) = run_table(Behavior::Reply(Vec::new()), std::future::pending()).await;

    assert_eq!(
        report.expect("prune succeeds"),
        "ID  RECLAIMABLE  SIZE  DESCRIPTION\nReclaimed: 0B\nTotal: 0B\n"
    );
}

#[tokio::test]
async fn scenario_d_cancelled_mid_flight() {
    let started = Arc::new(Notify::new());
    let cancel = {
        let started = Arc::clone(&started);
        async move {
            started.notified().await;
            CancelReason::Interrupted
        }
    };

    let (report, counters) = run_table(Behavior::Stall(started), cancel).await;

    let err = report.expect_err("cancelled");
    assert!(matches!(err, Error::Cancelled { .. }), "{err}");
    assert_ne!(err.exit_code(), 0);
    assert_eq!(counters.prunes.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn deadline_cancels_a_stalled_prune() {
    let (report, counters) = run_table(
        Behavior::Stall(Arc::new(Notify::new())),
        cancellation_signal(Some(Duration::from_millis(50))),
    )
    .await;

    match report.expect_err("deadline") {
        Error::Cancelled { reason } => assert!(reason.contains("50ms"), "{reason}"),
        other => panic!("expected cancellation, got {other}"),
    }
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancellation_is_distinct_from_rejection() {
    let (rejected, counters) = run_table(
        Behavior::Reject("invalid filter 'type=='".to_string()),
        std::future::pending(),
    )
    .await;

    match rejected.expect_err("rejected") {
        Error::Request(message) => assert_eq!(message, "invalid filter 'type=='"),
        other => panic!("expected request error, got {other}"),
    }
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

/// Notes how many handles were released by the time each write arrives.
struct ReleaseAwareWriter {
    counters: Arc<Counters>,
    closes_at_write: Vec<usize>,
    bytes: Vec<u8>,
}

impl std::io::Write for ReleaseAwareWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.closes_at_write
            .push(self.counters.closes.load(Ordering::SeqCst));
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn output_is_written_only_after_the_handle_is_released() {
    let (executor, counters) = executor(Behavior::Reply(vec![CacheRecord::new("a", 1)]));
    let mut out = ReleaseAwareWriter {
        counters: Arc::clone(&counters),
        closes_at_write: Vec::new(),
        bytes: Vec::new(),
    };

    buildprune::cli::prune::prune(
        &default_args(),
        &executor,
        &Reporter::new(false),
        std::future::pending(),
        &mut out,
    )
    .await
    .expect("prune succeeds");

    assert!(!out.closes_at_write.is_empty());
    assert!(out.closes_at_write.iter().all(|&closes| closes == 1));
    assert!(String::from_utf8(out.bytes).expect("utf8").ends_with("Total: 1B\n"));
}

#[tokio::test]
async fn connection_failure_prints_nothing() {
    let (executor, counters) = executor(Behavior::RefuseConnection);
    let mut out = Vec::new();

    let err = buildprune::cli::prune::prune(
        &default_args(),
        &executor,
        &Reporter::new(false),
        std::future::pending(),
        &mut out,
    )
    .await
    .expect_err("connection refused");

    assert!(matches!(err, Error::Connection { .. }));
    assert!(out.is_empty());
    assert_eq!(counters.prunes.load(Ordering::SeqCst), 0);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn summary_covers_records_hidden_by_truncation() {
    let long = "z".repeat(120);
    let records = vec![
        CacheRecord::new("long", 2_000_000).with_description(long.clone()),
        CacheRecord::new("meta", 0).with_description("metadata only"),
        CacheRecord::new("pinned", 3_000_000).with_in_use(true),
    ];

    let (report, _) = run_table(Behavior::Reply(records), std::future::pending()).await;
    let report = report.expect("prune succeeds");

    assert!(report.contains(&format!("{}...", &long[..50])));
    assert!(!report.contains(&long));
    assert!(report.contains("meta  true  0B  metadata only\n"));
    assert!(report.ends_with("Reclaimed: 2MB\nTotal: 5MB\n"));
}

#[tokio::test]
async fn debug_mode_dumps_records_then_summary() {
    let (executor, _) = executor(Behavior::Reply(vec![
        CacheRecord::new("dbg", 1_500_000).with_description("layer"),
    ]));
    let mut out = Vec::new();

    buildprune::cli::prune::prune(
        &default_args(),
        &executor,
        &Reporter::new(true),
        std::future::pending(),
        &mut out,
    )
    .await
    .expect("prune succeeds");

    let report = String::from_utf8(out).expect("utf8");
    assert!(report.starts_with("ID:           dbg\n"));
    assert!(!report.contains("RECLAIMABLE"));
    assert!(report.ends_with("Reclaimed: 1.5MB\nTotal: 1.5MB\n"));
}

#[test]
fn positional_argument_is_rejected_before_any_backend_call() {
    let counters = Counters::default();

    let err = Cli::try_parse_from(["buildprune", "prune", "everything"])
        .expect_err("positional argument");

    assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    assert_ne!(err.exit_code(), 0);
    assert_eq!(counters.connects.load(Ordering::SeqCst), 0);
}
