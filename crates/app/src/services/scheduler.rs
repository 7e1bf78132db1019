use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::reconciler::Reconciler;

/// Fixed-period driver for the reconciler.
///
/// Each cycle is awaited before the next tick is taken, so two cycles never
/// run at the same time.
pub struct Scheduler {
    reconciler: Arc<Reconciler>,
    period: Duration,
    started: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(reconciler: Arc<Reconciler>, period: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            reconciler,
            period,
            started: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Spawn the polling loop. Only the first call does anything.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("poll scheduler already running");
            return None;
        }

        let reconciler = Arc::clone(&self.reconciler);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let period = self.period;
        info!(interval_secs = period.as_secs(), "starting poll scheduler");

        Some(tokio::spawn(run_loop(reconciler, period, shutdown_rx)))
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Stop after the cycle in flight, if any, has finished.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

async fn run_loop(reconciler: Arc<Reconciler>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown_rx.borrow_and_update() {
            break;
        }

        tokio::select! {
            _ = interval.tick() => {
                reconciler.run_if_ready().await;
            }
            changed = shutdown_rx.changed() => {
                // Sender gone: the scheduler itself was dropped
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("poll scheduler stopped");
}
