//! Integration tests for the smart link task.
//!
//! These tests drive a spawned link end to end through its handle: triggers
//! and requests go in, primitive calls and lifecycle hooks come out. Time is
//! paused so trigger delays and retry backoff can be asserted exactly.
//!
//! Run with: `cargo test --test link_integration`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smartlink::prefetch::{
    EffectiveClass, LinkConfig, LinkHandle, LinkTarget, NetworkSnapshot, NetworkSource,
    PrefetchError, PrefetchFuture, PrefetchObserver, PrefetchPrimitive, PrefetchStatus,
    PriorityClass, SimulatedPrimitive, SmartLink,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Mock Implementations
// =============================================================================

/// Primitive that records every call and fails a scripted number of times.
struct MockPrimitive {
    latency: Duration,
    failures_remaining: AtomicU32,
    calls: Mutex<Vec<(LinkTarget, Instant, CancellationToken)>>,
}

impl MockPrimitive {
    fn new(latency: Duration) -> Arc<Self> {
        Self::failing(latency, 0)
    }

    fn failing(latency: Duration, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            latency,
            failures_remaining: AtomicU32::new(failures),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at, _)| *at).collect()
    }

    fn token(&self, index: usize) -> CancellationToken {
        self.calls.lock().unwrap()[index].2.clone()
    }
}

impl PrefetchPrimitive for MockPrimitive {
    fn prefetch(&self, target: LinkTarget, cancellation_token: CancellationToken) -> PrefetchFuture {
        self.calls
            .lock()
            .unwrap()
            .push((target, Instant::now(), cancellation_token.clone()));
        let fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let latency = self.latency;

        Box::pin(async move {
            tokio::select! {
                _ = cancellation_token.cancelled() => Err(PrefetchError::Cancelled),
                _ = tokio::time::sleep(latency) => {
                    if fail {
                        Err(PrefetchError::Failed { detail: "mock failure".to_string() })
                    } else {
                        Ok(())
                    }
                }
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Hook {
    Start,
    Success,
    Error,
    Retry(u32),
}

/// Observer that records hooks in order.
#[derive(Default)]
struct RecordingObserver {
    hooks: Mutex<Vec<Hook>>,
}

impl RecordingObserver {
    fn hooks(&self) -> Vec<Hook> {
        self.hooks.lock().unwrap().clone()
    }

    fn count(&self, hook: &Hook) -> usize {
        self.hooks().iter().filter(|h| *h == hook).count()
    }

    fn record(&self, hook: Hook) {
        self.hooks.lock().unwrap().push(hook);
    }
}

impl PrefetchObserver for RecordingObserver {
    fn on_prefetch_start(&self) {
        self.record(Hook::Start);
    }

    fn on_prefetch_success(&self) {
        self.record(Hook::Success);
    }

    fn on_prefetch_error(&self, _error: &PrefetchError) {
        self.record(Hook::Error);
    }

    fn on_prefetch_retry(&self, attempt: u32) {
        self.record(Hook::Retry(attempt));
    }
}

// =============================================================================
// Helpers
// =============================================================================

const LATENCY: Duration = Duration::from_millis(10);

fn network(class: EffectiveClass, reduced_data: bool) -> NetworkSource {
    NetworkSource::new(NetworkSnapshot::new(class, reduced_data))
}

fn spawn_link(
    config: LinkConfig,
    primitive: &Arc<MockPrimitive>,
    observer: &Arc<RecordingObserver>,
    network: &NetworkSource,
) -> LinkHandle {
    SmartLink::builder("/docs", primitive.clone())
        .config(config)
        .observer(observer.clone())
        .network(network.clone())
        .spawn()
}

/// Let the link drain its queue and any timers due within `duration`.
async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}

async fn wait_for(link: &LinkHandle, status: PrefetchStatus) {
    link.wait_for_status(|s| s.status == status)
        .await
        .expect("link closed before reaching status");
}

// =============================================================================
// Eligibility
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_high_priority_prefetches_on_2g() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::TwoG, false);
    let link = spawn_link(
        LinkConfig::new().with_priority(PriorityClass::High),
        &primitive,
        &observer,
        &source,
    );

    link.viewport_enter().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;

    assert_eq!(primitive.call_count(), 1);
    assert_eq!(primitive.calls.lock().unwrap()[0].0.as_str(), "/docs");
    assert_eq!(observer.hooks(), vec![Hook::Start, Hook::Success]);
}

#[tokio::test(start_paused = true)]
async fn test_low_priority_never_prefetches_on_3g() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::ThreeG, false);
    let link = spawn_link(
        LinkConfig::new().with_priority(PriorityClass::Low),
        &primitive,
        &observer,
        &source,
    );

    assert!(!link.status().eligible);

    link.viewport_enter().unwrap();
    link.pointer_enter().unwrap();
    link.focus().unwrap();
    link.request().unwrap();
    settle(Duration::from_secs(5)).await;

    assert_eq!(primitive.call_count(), 0);
    assert!(observer.hooks().is_empty());
    assert_eq!(link.status().status, PrefetchStatus::Idle);
    assert_eq!(link.stats().denied, 4);
}

#[tokio::test(start_paused = true)]
async fn test_reduced_data_denies_high_priority() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, true);
    let link = spawn_link(
        LinkConfig::new().with_priority(PriorityClass::High),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 0);
    assert!(!link.status().eligible);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_link_never_prefetches() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_prefetch_enabled(false),
        &primitive,
        &observer,
        &source,
    );

    link.viewport_enter().unwrap();
    link.request().unwrap();
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_external_target_never_prefetches() {
    let primitive = MockPrimitive::new(LATENCY);
    let source = network(EffectiveClass::FourG, false);
    let link = SmartLink::builder("https://example.com/docs", primitive.clone())
        .network(source)
        .spawn();

    link.request().unwrap();
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 0);
    assert!(!link.status().eligible);
}

#[tokio::test(start_paused = true)]
async fn test_network_change_updates_eligibility() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_priority(PriorityClass::Low),
        &primitive,
        &observer,
        &source,
    );

    assert!(link.status().eligible);

    source.publish(NetworkSnapshot::new(EffectiveClass::ThreeG, false));
    let snapshot = link.wait_for_status(|s| !s.eligible).await.unwrap();
    assert_eq!(snapshot.network.effective_class, EffectiveClass::ThreeG);

    link.viewport_enter().unwrap();
    settle(Duration::from_secs(1)).await;
    assert_eq!(primitive.call_count(), 0);

    // Eligibility is re-evaluated on the next trigger once the network recovers.
    source.publish(NetworkSnapshot::new(EffectiveClass::FourG, false));
    link.wait_for_status(|s| s.eligible).await.unwrap();
    link.viewport_leave().unwrap();
    link.viewport_enter().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;
    assert_eq!(primitive.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_link_without_network_source_assumes_fast_network() {
    let primitive = MockPrimitive::new(LATENCY);
    let link = SmartLink::builder("/docs", primitive.clone())
        .config(LinkConfig::new().with_priority(PriorityClass::Low))
        .spawn();

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;
    assert_eq!(primitive.call_count(), 1);
}

// =============================================================================
// Triggers
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_viewport_leave_before_delay_prevents_call() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_viewport_delay(Duration::from_millis(300)),
        &primitive,
        &observer,
        &source,
    );

    link.viewport_enter().unwrap();
    settle(Duration::from_millis(100)).await;
    link.viewport_leave().unwrap();
    settle(Duration::from_secs(2)).await;

    assert_eq!(primitive.call_count(), 0);
    assert!(observer.hooks().is_empty());
    assert_eq!(link.status().status, PrefetchStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_viewport_delay_elapses_then_prefetches() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_viewport_delay(Duration::from_millis(300)),
        &primitive,
        &observer,
        &source,
    );

    let entered = Instant::now();
    link.viewport_enter().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;

    let waited = primitive.call_times()[0] - entered;
    assert!(waited >= Duration::from_millis(300), "fired after {:?}", waited);
    assert!(waited < Duration::from_millis(310), "fired after {:?}", waited);
}

#[tokio::test(start_paused = true)]
async fn test_pointer_leave_cancels_hover_but_focus_prefetches() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new()
            .with_viewport_enabled(false)
            .with_hover_delay(Duration::from_millis(200)),
        &primitive,
        &observer,
        &source,
    );

    link.pointer_enter().unwrap();
    settle(Duration::from_millis(50)).await;
    link.pointer_leave().unwrap();
    settle(Duration::from_secs(1)).await;
    assert_eq!(primitive.call_count(), 0);

    link.focus().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;
    assert_eq!(primitive.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_viewport_channel_ignores_visibility() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_viewport_enabled(false),
        &primitive,
        &observer,
        &source,
    );

    link.viewport_enter().unwrap();
    settle(Duration::from_secs(1)).await;
    assert_eq!(primitive.call_count(), 0);
}

// =============================================================================
// Requests and Retry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_request_after_success_is_noop() {
    let primitive = MockPrimitive::new(LATENCY);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(LinkConfig::new(), &primitive, &observer, &source);

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;

    link.request().unwrap();
    link.viewport_enter().unwrap();
    link.pointer_enter().unwrap();
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 1);
    assert_eq!(observer.count(&Hook::Start), 1);
    assert_eq!(link.status().status, PrefetchStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn test_request_while_loading_is_deduplicated() {
    let primitive = MockPrimitive::new(Duration::from_millis(100));
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(LinkConfig::new(), &primitive, &observer, &source);

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Loading).await;
    link.request().unwrap();
    link.focus().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;

    assert_eq!(primitive.call_count(), 1);
    assert_eq!(link.stats().deduplicated, 2);
}

#[tokio::test(start_paused = true)]
async fn test_retries_with_exponential_backoff_then_one_error() {
    let base = Duration::from_millis(100);
    let primitive = MockPrimitive::failing(LATENCY, u32::MAX);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_max_attempts(3).with_base_retry_delay(base),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    let snapshot = link
        .wait_for_status(|s| s.status == PrefetchStatus::Error)
        .await
        .unwrap();
    assert_eq!(snapshot.attempt, 3);
    assert_eq!(snapshot.max_attempts, 3);

    settle(Duration::from_secs(10)).await;

    let times = primitive.call_times();
    assert_eq!(times.len(), 4);
    for (i, pair) in times.windows(2).enumerate() {
        let expected = LATENCY + base * 2u32.pow(i as u32);
        let gap = pair[1] - pair[0];
        assert!(gap >= expected, "gap {} was {:?}", i, gap);
        assert!(gap < expected + Duration::from_millis(5), "gap {} was {:?}", i, gap);
    }

    assert_eq!(
        observer.hooks(),
        vec![
            Hook::Start,
            Hook::Retry(1),
            Hook::Start,
            Hook::Retry(2),
            Hook::Start,
            Hook::Retry(3),
            Hook::Start,
            Hook::Error,
        ]
    );
    assert_eq!(link.stats().failed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failure_then_recovery_succeeds_on_retry() {
    let primitive = MockPrimitive::failing(LATENCY, 2);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_base_retry_delay(Duration::from_millis(50)),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    let snapshot = link
        .wait_for_status(|s| s.status == PrefetchStatus::Success)
        .await
        .unwrap();

    assert_eq!(primitive.call_count(), 3);
    assert_eq!(snapshot.attempt, 0);
    assert_eq!(observer.hooks()[..4], [Hook::Start, Hook::Retry(1), Hook::Start, Hook::Retry(2)]);
    assert_eq!(observer.count(&Hook::Success), 1);
    assert_eq!(observer.count(&Hook::Error), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_max_attempts_errors_immediately() {
    let primitive = MockPrimitive::failing(LATENCY, 1);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_max_attempts(0),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Error).await;
    settle(Duration::from_secs(5)).await;

    assert_eq!(primitive.call_count(), 1);
    assert_eq!(observer.hooks(), vec![Hook::Start, Hook::Error]);
}

#[tokio::test(start_paused = true)]
async fn test_request_after_error_starts_fresh() {
    let primitive = MockPrimitive::failing(LATENCY, 1);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_max_attempts(0),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Error).await;

    link.request().unwrap();
    let snapshot = link
        .wait_for_status(|s| s.status == PrefetchStatus::Success)
        .await
        .unwrap();

    assert_eq!(primitive.call_count(), 2);
    assert_eq!(snapshot.attempt, 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_denied_when_network_degrades() {
    let primitive = MockPrimitive::failing(LATENCY, 1);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new()
            .with_priority(PriorityClass::Low)
            .with_base_retry_delay(Duration::from_millis(500)),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Retrying).await;
    source.publish(NetworkSnapshot::new(EffectiveClass::TwoG, false));
    settle(Duration::from_secs(2)).await;

    assert_eq!(primitive.call_count(), 1);
    assert_eq!(link.status().status, PrefetchStatus::Retrying);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_superseded_result_is_ignored() {
    let primitive = MockPrimitive::new(Duration::from_millis(100));
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(LinkConfig::new(), &primitive, &observer, &source);

    link.request().unwrap();
    settle(Duration::from_millis(20)).await;
    link.supersede().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 2);
    assert!(primitive.token(0).is_cancelled());
    assert!(!primitive.token(1).is_cancelled());
    assert_eq!(observer.hooks(), vec![Hook::Start, Hook::Start, Hook::Success]);
    assert_eq!(link.stats().cancelled, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_during_call_cancels_and_silences_hooks() {
    let primitive = MockPrimitive::new(Duration::from_millis(100));
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(LinkConfig::new(), &primitive, &observer, &source);

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Loading).await;
    drop(link);
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 1);
    assert!(primitive.token(0).is_cancelled());
    assert_eq!(observer.hooks(), vec![Hook::Start]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_retry() {
    let primitive = MockPrimitive::failing(LATENCY, 1);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_base_retry_delay(Duration::from_millis(500)),
        &primitive,
        &observer,
        &source,
    );

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Retrying).await;
    link.shutdown();
    settle(Duration::from_secs(5)).await;

    assert!(link.is_closed());
    assert_eq!(primitive.call_count(), 1);
    assert_eq!(observer.hooks(), vec![Hook::Start, Hook::Retry(1)]);
    assert_eq!(link.request(), Err(PrefetchError::LinkClosed));
}

#[tokio::test(start_paused = true)]
async fn test_close_waits_for_task_exit() {
    let primitive = MockPrimitive::new(Duration::from_millis(100));
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(
        LinkConfig::new().with_viewport_delay(Duration::from_millis(200)),
        &primitive,
        &observer,
        &source,
    );

    link.viewport_enter().unwrap();
    link.close().await;
    settle(Duration::from_secs(1)).await;

    assert_eq!(primitive.call_count(), 0);
    assert!(observer.hooks().is_empty());
}

// =============================================================================
// Status
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_indicator_only_when_status_shown() {
    let primitive = MockPrimitive::failing(LATENCY, 1);
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);

    let hidden = spawn_link(LinkConfig::new(), &primitive, &observer, &source);
    assert!(hidden.indicator().is_none());

    let shown = spawn_link(
        LinkConfig::new()
            .with_show_status(true)
            .with_base_retry_delay(Duration::from_millis(500)),
        &primitive,
        &observer,
        &source,
    );
    let indicator = shown.indicator().unwrap();
    assert_eq!(indicator.status, PrefetchStatus::Idle);
    assert_eq!(indicator.tooltip(), "Prefetch status: idle");

    shown.request().unwrap();
    wait_for(&shown, PrefetchStatus::Retrying).await;
    let indicator = shown.indicator().unwrap();
    assert_eq!(indicator.attempt, 1);
    assert_eq!(indicator.tooltip(), "Prefetch status: retrying (Attempt 1/2)");
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_status_progression() {
    let primitive = MockPrimitive::new(Duration::from_millis(100));
    let observer = Arc::new(RecordingObserver::default());
    let source = network(EffectiveClass::FourG, false);
    let link = spawn_link(LinkConfig::new(), &primitive, &observer, &source);

    let mut rx = link.subscribe();
    link.request().unwrap();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().status, PrefetchStatus::Loading);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().status, PrefetchStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_primitive_drives_link() {
    let primitive = Arc::new(SimulatedPrimitive::new(LATENCY).with_failures(1));
    let link = SmartLink::builder("/pricing", primitive.clone())
        .config(LinkConfig::new().with_base_retry_delay(Duration::from_millis(50)))
        .spawn();

    link.request().unwrap();
    wait_for(&link, PrefetchStatus::Success).await;

    assert_eq!(primitive.calls(), 2);
    assert_eq!(link.target().as_str(), "/pricing");
}
