//! Composition root: builds the adapters, wires them into the services and
//! runs until interrupted.

use anyhow::{Context, Result};
use commitwatch_core::ports::{CommitSource, NotificationTarget, Notifier, StateStore, SystemClock};
use commitwatch_core::tracking::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapters::{
    github::GitHubCommitSource,
    log::LogNotifier,
    persistence::JsonStateStore,
    webhook::WebhookNotifier,
};
use crate::config::Config;
use crate::http;
use crate::services::{AppService, Reconciler, Scheduler};

/// Open the tracking state, merging in the configured locked set.
pub fn open_tracker(config: &Config) -> Result<Tracker> {
    let locked = config.locked_ids()?;
    let state_path = config.state_path()?;
    let store: Arc<dyn StateStore> = Arc::new(JsonStateStore::with_path(&state_path));

    let tracker = Tracker::open(store, &locked)
        .with_context(|| format!("Failed to load tracking state from {}", state_path.display()))?;

    for raw in tracker.discarded_on_load() {
        warn!(id = %raw, "discarding malformed or unmonitored entry from state file");
    }
    info!(
        repos = tracker.registry().len(),
        locked = locked.len(),
        state = %state_path.display(),
        "loaded tracking state"
    );
    Ok(tracker)
}

pub fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    if config.notify.dry_run {
        info!("dry run: announcements are logged, not delivered");
        return Ok(Arc::new(LogNotifier));
    }

    let target = config.notify.webhook_url.clone().map(NotificationTarget);
    if target.is_none() {
        warn!("no webhook configured; commit checks wait until a target is set");
    }
    let notifier = WebhookNotifier::new(target, config.notify.timeout_secs)
        .context("Failed to create webhook client")?;
    Ok(Arc::new(notifier))
}

/// Run the service until ctrl-c, or for a single cycle when `once` is set.
pub async fn run(config: Config, once: bool) -> Result<()> {
    info!("Starting commitwatch");

    let tracker = Arc::new(Mutex::new(open_tracker(&config)?));
    let source: Arc<dyn CommitSource> = Arc::new(
        GitHubCommitSource::new(&config.github).context("Failed to create GitHub client")?,
    );
    let notifier = build_notifier(&config)?;

    let reconciler = Arc::new(
        Reconciler::new(tracker.clone(), source, notifier.clone())
            .with_fetch_limit(config.fetch_limit)
            .with_fetch_concurrency(config.fetch_concurrency),
    );

    if once {
        if let Some(report) = reconciler.run_if_ready().await {
            info!(announced = report.announced(), "single check complete");
        }
        return Ok(());
    }

    let service = Arc::new(AppService::new(tracker, notifier, Arc::new(SystemClock)));
    let http_task = config
        .http
        .enabled
        .then(|| spawn_http(config.http.bind.clone(), service));

    let scheduler = Scheduler::new(reconciler, config.poll_interval());
    let poll_task = scheduler.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    info!("Shutting down commitwatch");

    scheduler.shutdown();
    if let Some(task) = poll_task {
        if let Err(e) = task.await {
            error!("Poll task failed: {:?}", e);
        }
    }
    if let Some(task) = http_task {
        task.abort();
    }

    info!("commitwatch shut down cleanly");
    Ok(())
}

/// The HTTP endpoint lives in its own task; if it dies, polling carries on.
fn spawn_http(bind: String, service: Arc<AppService>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = http::serve(&bind, service).await {
            error!(addr = %bind, error = %format!("{e:#}"), "http endpoint stopped, polling continues");
        }
    })
}
