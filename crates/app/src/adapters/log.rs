use anyhow::Result;
use async_trait::async_trait;
use commitwatch_core::domain::{Commit, RepositoryId};
use commitwatch_core::ports::{NotificationTarget, Notifier};
use tracing::info;

/// Dry-run notifier: writes each announcement to the log instead of a channel.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn set_target(&self, _target: NotificationTarget) {
        info!("dry run: notification target ignored");
    }

    async fn notify(&self, repo: &RepositoryId, commit: &Commit) -> Result<()> {
        info!(
            repo = %repo,
            sha = %commit.short_sha(),
            author = %commit.author.name,
            url = %commit.html_url,
            "new commit: {}",
            commit.truncated_message(72).lines().next().unwrap_or_default()
        );
        Ok(())
    }
}
