//! Port fakes shared by the integration tests.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use commitwatch::services::{AppService, Reconciler};
use commitwatch_core::domain::{Author, Commit, RepositoryId};
use commitwatch_core::ports::{
    CommitSource, MemoryStateStore, NotificationTarget, Notifier, StateStore, SystemClock,
};
use commitwatch_core::tracking::Tracker;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn id(raw: &str) -> RepositoryId {
    RepositoryId::parse(raw).unwrap()
}

/// Commit number `n`; higher numbers are newer.
pub fn commit(n: i64) -> Commit {
    Commit {
        sha: format!("sha{n}"),
        message: format!("commit {n}"),
        author: Author {
            name: "dev".to_string(),
            avatar_url: None,
        },
        timestamp: Utc.timestamp_opt(1_700_000_000 + n * 60, 0).unwrap(),
        html_url: format!("https://example.invalid/commit/{n}"),
    }
}

/// Newest-first fetch window from `newest` down to `oldest`.
pub fn window(newest: i64, oldest: i64) -> Vec<Commit> {
    (oldest..=newest).rev().map(commit).collect()
}

enum Response {
    Commits(Vec<Commit>),
    Fail,
}

/// Scripted CommitSource. Unknown repositories return no commits.
#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<HashMap<RepositoryId, Response>>,
    holds: Mutex<HashMap<RepositoryId, Arc<Notify>>>,
    delay: Option<Duration>,
    delays: Mutex<HashMap<RepositoryId, Duration>>,
    deadline: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Fail any fetch that is still pending after `deadline`, checked when
    /// the fetch is next polled, the way an HTTP client timeout behaves.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Fetches of `repo` take `delay`, on top of any global delay.
    pub fn set_delay(&self, repo: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(id(repo), delay);
    }

    pub fn set(&self, repo: &str, commits: Vec<Commit>) {
        self.responses
            .lock()
            .unwrap()
            .insert(id(repo), Response::Commits(commits));
    }

    pub fn fail(&self, repo: &str) {
        self.responses.lock().unwrap().insert(id(repo), Response::Fail);
    }

    /// Block fetches of `repo` until the returned handle is notified.
    pub fn hold(&self, repo: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(id(repo), gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommitSource for FakeSource {
    async fn fetch(&self, repo: &RepositoryId, limit: usize) -> Result<Vec<Commit>> {
        let started = tokio::time::Instant::now();
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let gate = self.holds.lock().unwrap().get(repo).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let delay = self.delays.lock().unwrap().get(repo).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(deadline) = self.deadline {
            if started.elapsed() > deadline {
                anyhow::bail!("fetch for {repo} timed out");
            }
        }
        match self.responses.lock().unwrap().get(repo) {
            Some(Response::Commits(commits)) => Ok(commits.iter().take(limit).cloned().collect()),
            Some(Response::Fail) => anyhow::bail!("simulated fetch failure for {repo}"),
            None => Ok(Vec::new()),
        }
    }
}

/// Notifier that records deliveries in order.
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
    ready: AtomicBool,
    target: Mutex<Option<NotificationTarget>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            ready: AtomicBool::new(true),
            target: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Every delivery takes `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Reject the notification for commit `sha`.
    pub fn fail_on(&self, sha: &str) {
        self.failing.lock().unwrap().insert(sha.to_string());
    }

    /// Delivered shas for `repo`, in delivery order.
    pub fn shas_for(&self, repo: &str) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == repo)
            .map(|(_, sha)| sha.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn target(&self) -> Option<NotificationTarget> {
        self.target.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn destination_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn set_target(&self, target: NotificationTarget) {
        *self.target.lock().unwrap() = Some(target);
        self.set_ready(true);
    }

    async fn notify(&self, repo: &RepositoryId, commit: &Commit) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&commit.sha) {
            anyhow::bail!("simulated delivery failure");
        }
        self.delivered
            .lock()
            .unwrap()
            .push((repo.to_string(), commit.sha.clone()));
        Ok(())
    }
}

/// Everything needed to drive a reconciler against fakes.
pub struct Harness {
    pub store: Arc<MemoryStateStore>,
    pub tracker: Arc<tokio::sync::Mutex<Tracker>>,
    pub source: Arc<FakeSource>,
    pub notifier: Arc<RecordingNotifier>,
    pub reconciler: Arc<Reconciler>,
    pub service: AppService,
}

impl Harness {
    pub fn new(locked: &[&str], repos: &[&str]) -> Self {
        Self::with_source(FakeSource::new(), locked, repos)
    }

    pub fn with_source(source: FakeSource, locked: &[&str], repos: &[&str]) -> Self {
        let store = Arc::new(MemoryStateStore::new());
        let locked: Vec<_> = locked.iter().map(|raw| id(raw)).collect();
        let mut tracker = Tracker::open(store.clone() as Arc<dyn StateStore>, &locked).unwrap();
        for repo in repos {
            tracker.add(repo).unwrap();
        }
        let tracker = Arc::new(tokio::sync::Mutex::new(tracker));

        let source = Arc::new(source);
        let notifier = Arc::new(RecordingNotifier::new());
        let reconciler = Arc::new(Reconciler::new(
            tracker.clone(),
            source.clone(),
            notifier.clone(),
        ));
        let service = AppService::new(tracker.clone(), notifier.clone(), Arc::new(SystemClock));

        Self {
            store,
            tracker,
            source,
            notifier,
            reconciler,
            service,
        }
    }

    pub async fn frontier(&self, repo: &str) -> Option<String> {
        self.tracker.lock().await.frontier(&id(repo)).map(str::to_owned)
    }
}
