use anyhow::Result;
use commitwatch_core::domain::{short_sha, Commit, CycleReport, RepoOutcome, RepositoryId};
use commitwatch_core::ports::{CommitSource, Notifier};
use commitwatch_core::tracking::{plan, Plan, Tracker};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

pub const DEFAULT_FETCH_LIMIT: usize = 5;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Drives one reconciliation pass over every monitored repository.
///
/// Fetches run concurrently on a separate task. Each result is applied on
/// its own while holding the tracker lock for the whole plan/notify/advance
/// sequence, so a concurrent removal either happens before (and the repository is
/// dropped) or after (and its frontier is discarded).
pub struct Reconciler {
    tracker: Arc<Mutex<Tracker>>,
    source: Arc<dyn CommitSource>,
    notifier: Arc<dyn Notifier>,
    fetch_limit: usize,
    fetch_concurrency: usize,
}

impl Reconciler {
    pub fn new(
        tracker: Arc<Mutex<Tracker>>,
        source: Arc<dyn CommitSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tracker,
            source,
            notifier,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit.max(1);
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    /// Run a cycle unless the notifier has nowhere to deliver.
    pub async fn run_if_ready(&self) -> Option<CycleReport> {
        if !self.notifier.destination_ready().await {
            warn!("skipping commit check: no notification target configured");
            return None;
        }
        Some(self.run_cycle().await)
    }

    /// One pass over the registry. Failures are isolated per repository.
    pub async fn run_cycle(&self) -> CycleReport {
        let repos: Vec<RepositoryId> = self.tracker.lock().await.registry().ids().to_vec();
        info!(repos = repos.len(), "starting commit check");

        // Fetches are driven on their own task so they keep making progress
        // while a result is being applied under the lock
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = Arc::clone(&self.source);
        let limit = self.fetch_limit;
        let concurrency = self.fetch_concurrency;
        let driver = tokio::spawn(async move {
            let mut fetches = stream::iter(repos)
                .map(|repo| {
                    let source = Arc::clone(&source);
                    async move {
                        let fetched = source.fetch(&repo, limit).await;
                        (repo, fetched)
                    }
                })
                .buffer_unordered(concurrency);

            while let Some(result) = fetches.next().await {
                if tx.send(result).is_err() {
                    break;
                }
            }
        });

        let mut report = CycleReport::default();
        while let Some((repo, fetched)) = rx.recv().await {
            let outcome = self.reconcile(&repo, fetched).await;
            report.record(repo, outcome);
        }
        if let Err(e) = driver.await {
            error!(error = %e, "fetch task failed, cycle is incomplete");
        }

        info!(
            repos = report.outcomes.len(),
            announced = report.announced(),
            skipped = report.skipped(),
            failed = report.failed(),
            "commit check finished"
        );
        report
    }

    /// Apply one fetch result to the tracking state.
    pub async fn reconcile(&self, repo: &RepositoryId, fetched: Result<Vec<Commit>>) -> RepoOutcome {
        let commits = match fetched {
            Ok(commits) => commits,
            Err(e) => {
                warn!(repo = %repo, error = %format!("{e:#}"), "failed to fetch commits, skipping");
                return RepoOutcome::Skipped;
            }
        };
        debug!(repo = %repo, count = commits.len(), "fetched commits");

        let mut tracker = self.tracker.lock().await;
        if !tracker.contains(repo) {
            info!(repo = %repo, "repository removed during check, dropping result");
            return RepoOutcome::Dropped;
        }
        let frontier = tracker.frontier(repo).map(str::to_owned);

        match plan(commits, frontier.as_deref()) {
            Plan::Skip => {
                warn!(repo = %repo, "no commits returned, skipping");
                RepoOutcome::Skipped
            }

            Plan::Baseline { sha } => match tracker.advance(repo, &sha) {
                Ok(()) => {
                    info!(repo = %repo, sha = %short_sha(&sha), "initialized tracking, nothing announced");
                    RepoOutcome::Baseline { sha }
                }
                Err(e) => {
                    error!(repo = %repo, error = %e, "failed to persist initial frontier");
                    RepoOutcome::PersistenceFailed
                }
            },

            Plan::Unchanged => {
                debug!(repo = %repo, sha = %short_sha(frontier.as_deref().unwrap_or_default()), "no new commits");
                RepoOutcome::Unchanged
            }

            Plan::Announce { commits, latest, gap } => {
                let old = frontier.as_deref().unwrap_or_default();
                info!(
                    repo = %repo,
                    old = %short_sha(old),
                    new = %short_sha(&latest),
                    count = commits.len(),
                    "new commits detected"
                );
                if gap {
                    warn!(
                        repo = %repo,
                        old = %short_sha(old),
                        window = commits.len(),
                        "previous frontier is outside the fetch window, older commits will not be announced"
                    );
                }

                let mut failed = 0;
                for commit in &commits {
                    if let Err(e) = self.notifier.notify(repo, commit).await {
                        failed += 1;
                        warn!(
                            repo = %repo,
                            sha = %commit.short_sha(),
                            error = %format!("{e:#}"),
                            "failed to deliver notification"
                        );
                    }
                }

                match tracker.advance(repo, &latest) {
                    Ok(()) => {
                        info!(repo = %repo, sha = %short_sha(&latest), "announced and updated frontier");
                        RepoOutcome::Announced {
                            count: commits.len(),
                            failed,
                            gap,
                        }
                    }
                    Err(e) => {
                        error!(
                            repo = %repo,
                            error = %e,
                            "failed to persist frontier, commits will be announced again next check"
                        );
                        RepoOutcome::PersistenceFailed
                    }
                }
            }
        }
    }
}
