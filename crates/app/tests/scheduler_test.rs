//! Poll scheduling under a paused clock.

mod common;

use common::{window, FakeSource, Harness};
use commitwatch::services::{Reconciler, Scheduler};
use std::sync::Arc;
use std::time::Duration;

const PERIOD: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let h = Harness::new(&[], &["org/core"]);
    h.source.set("org/core", window(1, 1));
    let scheduler = Scheduler::new(Arc::clone(&h.reconciler), PERIOD);

    let handle = scheduler.start().expect("first start spawns the loop");
    assert!(scheduler.is_started());
    assert!(scheduler.start().is_none());

    tokio::time::sleep(Duration::from_secs(150)).await;
    scheduler.shutdown();
    handle.await.unwrap();

    // Ticks at 0s, 60s and 120s from a single loop
    assert_eq!(h.source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_slow_cycles_never_overlap() {
    let source = FakeSource::with_delay(Duration::from_secs(90));
    let h = Harness::with_source(source, &[], &["org/core"]);
    h.source.set("org/core", window(1, 1));
    let scheduler = Scheduler::new(Arc::clone(&h.reconciler), PERIOD);

    let handle = scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(400)).await;
    scheduler.shutdown();
    handle.await.unwrap();

    assert!(h.source.calls() >= 2);
    assert_eq!(h.source.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cycles_wait_for_a_notification_target() {
    let h = Harness::new(&[], &["org/core"]);
    h.source.set("org/core", window(1, 1));
    h.notifier.set_ready(false);
    let scheduler = Scheduler::new(Arc::clone(&h.reconciler), PERIOD);

    let handle = scheduler.start().unwrap();
    tokio::time::sleep(Duration::from_secs(130)).await;
    assert_eq!(h.source.calls(), 0);

    h.notifier.set_ready(true);
    tokio::time::sleep(Duration::from_secs(60)).await;
    scheduler.shutdown();
    handle.await.unwrap();

    assert_eq!(h.source.calls(), 1);
    assert_eq!(h.frontier("org/core").await.as_deref(), Some("sha1"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_tick_stops_the_loop() {
    let h = Harness::new(&[], &["org/core"]);
    let scheduler = Scheduler::new(Arc::clone(&h.reconciler), PERIOD);

    scheduler.shutdown();
    let handle = scheduler.start().unwrap();
    handle.await.unwrap();

    assert_eq!(h.source.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_concurrency_is_bounded() {
    let source = FakeSource::with_delay(Duration::from_secs(5));
    let h = Harness::with_source(source, &[], &["a/one", "a/two", "a/three", "a/four"]);

    let serial = Reconciler::new(h.tracker.clone(), h.source.clone(), h.notifier.clone())
        .with_fetch_concurrency(1);
    serial.run_cycle().await;
    assert_eq!(h.source.max_in_flight(), 1);

    let wide = Reconciler::new(h.tracker.clone(), h.source.clone(), h.notifier.clone())
        .with_fetch_concurrency(4);
    wide.run_cycle().await;
    assert_eq!(h.source.max_in_flight(), 4);
    assert_eq!(h.source.calls(), 8);
}
