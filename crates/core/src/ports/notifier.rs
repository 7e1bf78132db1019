use crate::domain::{commit::Commit, repo::RepositoryId};
use anyhow::Result;
use async_trait::async_trait;

/// Where notifications are delivered (a webhook URL for the bundled adapter).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationTarget(pub String);

impl std::fmt::Display for NotificationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port for announcing commits to the chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether a destination is configured. Poll cycles are skipped until it is.
    async fn destination_ready(&self) -> bool {
        true
    }

    /// Replace the delivery destination (in memory only).
    async fn set_target(&self, target: NotificationTarget);

    /// Deliver one notification for `commit` in `repo`.
    async fn notify(&self, repo: &RepositoryId, commit: &Commit) -> Result<()>;
}
