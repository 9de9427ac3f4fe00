//! Build cache pruning.
//!
//! [`PruneExecutor`] runs one prune against the cache service inside a fresh
//! session, racing it against a cancellation signal, and always releases the
//! backend handle before returning. [`summarize_usage`] totals the records
//! that came back.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildprune::backend::HttpConnector;
//! use buildprune::gc::{PruneExecutor, cancellation_signal, summarize_usage};
//! use buildprune::models::RetentionPolicy;
//!
//! let executor = PruneExecutor::new(HttpConnector::new("http://127.0.0.1:8235"));
//! let records = executor
//!     .execute(RetentionPolicy::new(), cancellation_signal(None))
//!     .await?;
//! let usage = summarize_usage(&records);
//! println!("reclaimed {} of {} bytes", usage.reclaimable_bytes, usage.total_bytes);
//! ```

mod cancel;
mod executor;
mod usage;

pub use cancel::{CancelReason, cancellation_signal};
pub use executor::PruneExecutor;
pub use usage::summarize_usage;
