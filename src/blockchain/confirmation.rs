//! Transaction confirmation polling.
//!
//! # Responsibilities
//! - Poll a receipt source until the transaction shows up in a mined block
//! - Bound the wait by a fixed number of attempts with a fixed interval
//! - Abort early when the caller's shutdown signal fires
//!
//! # Design Decisions
//! - Lookup errors are treated exactly like "not mined yet"
//! - No sleep after the final attempt
//! - The receipt source is passed in explicitly, never taken from global state

use alloy::primitives::TxHash;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::blockchain::types::{
    BlockchainResult, Confirmation, ConfirmationError, PolicyError, ReceiptSummary,
};
use crate::lifecycle::shutdown::signalled;
use crate::observability::metrics;

/// Default number of receipt checks.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default pause between receipt checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Anything that can fetch a transaction receipt.
#[async_trait]
pub trait ReceiptLookup: Send + Sync {
    /// Fetch the receipt for `tx_hash`; `Ok(None)` if the node doesn't know it yet.
    async fn lookup_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>>;
}

/// How long to keep checking for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl ConfirmationPolicy {
    /// Create a policy. Fails if `max_attempts` is zero.
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Wait until `tx_hash` is included in a mined block.
///
/// Performs at most `policy.max_attempts()` lookups and sleeps
/// `policy.interval()` between consecutive ones. Returns
/// [`ConfirmationError::TimedOut`] once the budget is exhausted.
pub async fn wait_for_confirmation<L>(
    lookup: &L,
    tx_hash: TxHash,
    policy: &ConfirmationPolicy,
) -> Result<Confirmation, ConfirmationError>
where
    L: ReceiptLookup + ?Sized,
{
    poll(lookup, tx_hash, policy, None).await
}

/// Same as [`wait_for_confirmation`], but returns
/// [`ConfirmationError::Cancelled`] as soon as `shutdown` fires.
pub async fn wait_for_confirmation_until<L>(
    lookup: &L,
    tx_hash: TxHash,
    policy: &ConfirmationPolicy,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<Confirmation, ConfirmationError>
where
    L: ReceiptLookup + ?Sized,
{
    poll(lookup, tx_hash, policy, Some(&mut shutdown)).await
}

async fn poll<L>(
    lookup: &L,
    tx_hash: TxHash,
    policy: &ConfirmationPolicy,
    mut shutdown: Option<&mut broadcast::Receiver<()>>,
) -> Result<Confirmation, ConfirmationError>
where
    L: ReceiptLookup + ?Sized,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        let lookup_result = match race(lookup.lookup_receipt(tx_hash), shutdown.as_deref_mut()).await {
            Some(result) => result,
            None => return Err(cancelled(tx_hash, attempt - 1)),
        };

        metrics::record_receipt_lookup(lookup_outcome(&lookup_result));

        match lookup_result {
            Ok(Some(receipt)) => {
                if let Some(block_number) = receipt.block_number {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        block_number = block_number,
                        attempt = attempt,
                        "Transaction mined"
                    );
                    metrics::record_confirmation("confirmed");
                    return Ok(Confirmation {
                        block_number,
                        attempts: attempt,
                        succeeded: receipt.status,
                        gas_used: receipt.gas_used,
                    });
                }
                tracing::debug!(tx_hash = %tx_hash, attempt = attempt, "Receipt has no block number yet");
            }
            Ok(None) => {
                tracing::debug!(tx_hash = %tx_hash, attempt = attempt, "Transaction pending");
            }
            Err(e) => {
                tracing::debug!(tx_hash = %tx_hash, attempt = attempt, error = %e, "Receipt lookup failed");
                last_error = Some(e.to_string());
            }
        }

        if attempt < policy.max_attempts
            && race(sleep(policy.interval), shutdown.as_deref_mut()).await.is_none()
        {
            return Err(cancelled(tx_hash, attempt));
        }
    }

    tracing::warn!(
        tx_hash = %tx_hash,
        max_attempts = policy.max_attempts,
        interval_ms = policy.interval.as_millis() as u64,
        "Transaction not mined within attempt budget"
    );
    metrics::record_confirmation("timed_out");

    Err(ConfirmationError::TimedOut {
        tx_hash,
        max_attempts: policy.max_attempts,
        interval: policy.interval,
        last_error,
    })
}

/// Metric label for one lookup. A receipt without a block is still pending.
fn lookup_outcome(result: &BlockchainResult<Option<ReceiptSummary>>) -> &'static str {
    match result {
        Ok(Some(receipt)) if receipt.block_number.is_some() => "found",
        Ok(_) => "pending",
        Err(_) => "error",
    }
}

/// Run `fut` to completion unless `shutdown` fires first.
async fn race<F: Future>(
    fut: F,
    shutdown: Option<&mut broadcast::Receiver<()>>,
) -> Option<F::Output> {
    match shutdown {
        Some(rx) => tokio::select! {
            biased;
            _ = signalled(rx) => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}

fn cancelled(tx_hash: TxHash, attempts: u32) -> ConfirmationError {
    tracing::info!(tx_hash = %tx_hash, attempts = attempts, "Confirmation wait cancelled");
    metrics::record_confirmation("cancelled");
    ConfirmationError::Cancelled { tx_hash, attempts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::BlockchainError;
    use crate::lifecycle::Shutdown;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays a fixed script of lookup results, then reports "pending" forever.
    struct ScriptedLookup {
        script: Mutex<VecDeque<BlockchainResult<Option<ReceiptSummary>>>>,
        calls: AtomicU32,
    }

    impl ScriptedLookup {
        fn new(script: Vec<BlockchainResult<Option<ReceiptSummary>>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReceiptLookup for ScriptedLookup {
        async fn lookup_receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    fn policy(max_attempts: u32) -> ConfirmationPolicy {
        ConfirmationPolicy::new(max_attempts, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert_eq!(
            ConfirmationPolicy::new(0, Duration::from_secs(1)),
            Err(PolicyError::ZeroAttempts)
        );
    }

    #[test]
    fn test_default_policy() {
        let policy = ConfirmationPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.interval(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_on_fourth_attempt() {
        let lookup = ScriptedLookup::new(vec![
            Ok(None),
            Ok(None),
            Ok(None),
            Ok(Some(ReceiptSummary::mined(42))),
        ]);
        let start = Instant::now();

        let confirmation = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(10))
            .await
            .unwrap();

        assert_eq!(confirmation.block_number, 42);
        assert_eq!(confirmation.attempts, 4);
        assert_eq!(lookup.calls(), 4);
        // Three sleeps of one second each
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_trailing_sleep() {
        let lookup = ScriptedLookup::new(Vec::new());
        let start = Instant::now();

        let err = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(10))
            .await
            .unwrap_err();

        assert_eq!(lookup.calls(), 10);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(9));
        assert!(elapsed < Duration::from_secs(10));
        match err {
            ConfirmationError::TimedOut {
                max_attempts,
                interval,
                last_error,
                ..
            } => {
                assert_eq!(max_attempts, 10);
                assert_eq!(interval, Duration::from_secs(1));
                assert!(last_error.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let lookup = ScriptedLookup::new(Vec::new());
        let start = Instant::now();

        let result = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(1)).await;

        assert!(matches!(result, Err(ConfirmationError::TimedOut { .. })));
        assert_eq!(lookup.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intermediate_errors_are_retried() {
        let lookup = ScriptedLookup::new(vec![
            Err(BlockchainError::Rpc("connection refused".into())),
            Ok(None),
            Err(BlockchainError::Timeout(10)),
            Ok(Some(ReceiptSummary::default())),
            Ok(Some(ReceiptSummary::mined(7))),
        ]);

        let confirmation = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(5))
            .await
            .unwrap();

        assert_eq!(confirmation.block_number, 7);
        assert_eq!(lookup.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_last_error() {
        let lookup = ScriptedLookup::new(vec![
            Err(BlockchainError::Rpc("first".into())),
            Err(BlockchainError::Rpc("second".into())),
        ]);

        let err = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(2))
            .await
            .unwrap_err();

        match err {
            ConfirmationError::TimedOut { last_error, .. } => {
                assert_eq!(last_error.as_deref(), Some("RPC error: second"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_receipt_still_confirms() {
        let lookup = ScriptedLookup::new(vec![Ok(Some(ReceiptSummary {
            block_number: Some(3),
            status: false,
            gas_used: 21_000,
            ..Default::default()
        }))]);

        let confirmation = wait_for_confirmation(&lookup, TxHash::ZERO, &policy(3))
            .await
            .unwrap();

        assert_eq!(confirmation.block_number, 3);
        assert!(!confirmation.succeeded);
        assert_eq!(confirmation.gas_used, 21_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_sleep() {
        let lookup = ScriptedLookup::new(Vec::new());
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();

        tokio::spawn(async move {
            sleep(Duration::from_millis(2500)).await;
            shutdown.trigger();
        });

        let err = wait_for_confirmation_until(&lookup, TxHash::ZERO, &policy(10), rx)
            .await
            .unwrap_err();

        assert!(matches!(err, ConfirmationError::Cancelled { attempts: 3, .. }));
        assert_eq!(lookup.calls(), 3);
    }

    /// A node that takes far longer than the test to answer.
    struct StalledLookup {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ReceiptLookup for StalledLookup {
        async fn lookup_receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_secs(30)).await;
            Ok(Some(ReceiptSummary::mined(1)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_lookup() {
        let lookup = StalledLookup {
            calls: AtomicU32::new(0),
        };
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        let start = Instant::now();

        tokio::spawn(async move {
            sleep(Duration::from_secs(5)).await;
            shutdown.trigger();
        });

        let err = wait_for_confirmation_until(&lookup, TxHash::ZERO, &policy(10), rx)
            .await
            .unwrap_err();

        assert!(matches!(err, ConfirmationError::Cancelled { attempts: 0, .. }));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[test]
    fn test_unmined_receipt_counts_as_pending() {
        let unmined: BlockchainResult<Option<ReceiptSummary>> = Ok(Some(ReceiptSummary::default()));
        assert_eq!(lookup_outcome(&unmined), "pending");
        assert_eq!(lookup_outcome(&Ok(None)), "pending");
        assert_eq!(lookup_outcome(&Ok(Some(ReceiptSummary::mined(4)))), "found");
        assert_eq!(lookup_outcome(&Err(BlockchainError::Timeout(10))), "error");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_shutdown_does_not_cancel() {
        let lookup = ScriptedLookup::new(vec![Ok(None), Ok(Some(ReceiptSummary::mined(9)))]);
        let rx = Shutdown::new().subscribe();

        let confirmation = wait_for_confirmation_until(&lookup, TxHash::ZERO, &policy(3), rx)
            .await
            .unwrap();

        assert_eq!(confirmation.block_number, 9);
    }
}
