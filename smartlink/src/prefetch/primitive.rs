//! Prefetch primitive abstraction.
//!
//! The primitive is the external operation that actually warms a
//! destination (a router prefetch, an HTTP HEAD, a cache fill). The link only
//! decides when to call it. The trait returns a boxed future so primitives
//! can be held as trait objects and swapped at runtime.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::PrefetchError;
use super::types::LinkTarget;

/// Future returned by a prefetch primitive.
pub type PrefetchFuture = Pin<Box<dyn Future<Output = Result<(), PrefetchError>> + Send>>;

/// Asynchronous operation that prefetches one destination.
///
/// Implementations should observe `cancellation_token` and resolve with
/// [`PrefetchError::Cancelled`] when it fires, so an abort is never mistaken
/// for a failure. The link also races the future against the token, so a
/// primitive that ignores it is still safe.
pub trait PrefetchPrimitive: Send + Sync {
    fn prefetch(&self, target: LinkTarget, cancellation_token: CancellationToken) -> PrefetchFuture;
}

impl<F> PrefetchPrimitive for F
where
    F: Fn(LinkTarget, CancellationToken) -> PrefetchFuture + Send + Sync,
{
    fn prefetch(&self, target: LinkTarget, cancellation_token: CancellationToken) -> PrefetchFuture {
        self(target, cancellation_token)
    }
}

/// Primitive with configurable latency and a scripted number of failures.
///
/// Used by the CLI simulator and tests to exercise retry and cancellation
/// without a real network.
#[derive(Debug, Default)]
pub struct SimulatedPrimitive {
    latency: Duration,
    failures_remaining: AtomicU32,
    calls: AtomicU64,
}

impl SimulatedPrimitive {
    /// Succeeds after `latency` on every call.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failures_remaining: AtomicU32::new(0),
            calls: AtomicU64::new(0),
        }
    }

    /// Fail the first `failures` calls before succeeding.
    pub fn with_failures(self, failures: u32) -> Self {
        self.failures_remaining.store(failures, Ordering::SeqCst);
        self
    }

    /// Number of times the primitive has been invoked.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PrefetchPrimitive for SimulatedPrimitive {
    fn prefetch(&self, target: LinkTarget, cancellation_token: CancellationToken) -> PrefetchFuture {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let latency = self.latency;

        Box::pin(async move {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => Err(PrefetchError::Cancelled),
                _ = tokio::time::sleep(latency) => {
                    if fail {
                        Err(PrefetchError::failed(format!(
                            "simulated failure for {} (call {})",
                            target, call
                        )))
                    } else {
                        Ok(())
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_fails_then_succeeds() {
        let primitive = SimulatedPrimitive::new(Duration::from_millis(10)).with_failures(2);
        let target = LinkTarget::new("/a");

        for _ in 0..2 {
            let result = primitive
                .prefetch(target.clone(), CancellationToken::new())
                .await;
            assert!(matches!(result, Err(PrefetchError::Failed { .. })));
        }
        let result = primitive.prefetch(target, CancellationToken::new()).await;
        assert_eq!(result, Ok(()));
        assert_eq!(primitive.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_honours_cancellation() {
        let primitive = SimulatedPrimitive::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        let future = primitive.prefetch(LinkTarget::new("/a"), token.clone());
        token.cancel();

        assert_eq!(future.await, Err(PrefetchError::Cancelled));
    }

    #[tokio::test]
    async fn test_closure_primitive() {
        let primitive: Arc<dyn PrefetchPrimitive> =
            Arc::new(|target: LinkTarget, _token: CancellationToken| -> PrefetchFuture {
                Box::pin(async move {
                    if target.as_str() == "/ok" {
                        Ok(())
                    } else {
                        Err(PrefetchError::failed("not found"))
                    }
                })
            });

        assert!(primitive
            .prefetch(LinkTarget::new("/ok"), CancellationToken::new())
            .await
            .is_ok());
        assert!(primitive
            .prefetch(LinkTarget::new("/missing"), CancellationToken::new())
            .await
            .is_err());
    }
}
