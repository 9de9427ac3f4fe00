//! Cancellation signals for a pending prune.

use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Why a prune stopped waiting on the cache service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The process received an interrupt (Ctrl-C).
    Interrupted,
    /// The configured deadline elapsed.
    DeadlineExceeded(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => write!(f, "interrupted"),
            Self::DeadlineExceeded(after) => {
                write!(f, "no reply from cache service within {after:?}")
            },
        }
    }
}

/// Resolves on Ctrl-C or, if `deadline` is set, when it elapses.
pub async fn cancellation_signal(deadline: Option<Duration>) -> CancelReason {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Unable to listen for interrupt signal");
            std::future::pending::<()>().await;
        }
        CancelReason::Interrupted
    };

    let expiry = async {
        match deadline {
            Some(after) => {
                tokio::time::sleep(after).await;
                CancelReason::DeadlineExceeded(after)
            },
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        reason = interrupt => reason,
        reason = expiry => reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_fires() {
        let reason = cancellation_signal(Some(Duration::from_millis(5))).await;
        assert_eq!(reason, CancelReason::DeadlineExceeded(Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn test_no_deadline_stays_pending() {
        let outcome =
            tokio::time::timeout(Duration::from_millis(20), cancellation_signal(None)).await;
        assert!(outcome.is_err());
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(CancelReason::Interrupted.to_string(), "interrupted");
        assert_eq!(
            CancelReason::DeadlineExceeded(Duration::from_secs(2)).to_string(),
            "no reply from cache service within 2s"
        );
    }
}
