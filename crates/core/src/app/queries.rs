use crate::domain::repo::RepositoryId;
use crate::tracking::Tracker;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-only listing row for one monitored repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryView {
    pub id: RepositoryId,
    pub locked: bool,
    pub last_sha: Option<String>,
}

impl RepositoryView {
    /// Rows for every monitored repository, in insertion order.
    pub fn collect(tracker: &Tracker) -> Vec<Self> {
        tracker
            .list()
            .into_iter()
            .map(|entry| Self {
                last_sha: tracker.frontier(&entry.id).map(str::to_owned),
                id: entry.id,
                locked: entry.locked,
            })
            .collect()
    }
}

/// Process status summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    pub uptime: String,
    pub monitored: usize,
    pub locked: usize,
}

impl StatusView {
    pub fn new(started_at: DateTime<Utc>, now: DateTime<Utc>, tracker: &Tracker) -> Self {
        let uptime_secs = (now - started_at).num_seconds().max(0);
        let entries = tracker.list();
        Self {
            started_at,
            uptime_secs,
            uptime: format_uptime(uptime_secs),
            monitored: entries.len(),
            locked: entries.iter().filter(|e| e.locked).count(),
        }
    }
}

/// Render seconds as `{d}d {h}h {m}m {s}s`.
pub fn format_uptime(total_secs: i64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}
