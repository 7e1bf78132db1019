use chrono::{DateTime, Utc};
use commitwatch_core::app::{Command, Reply, RepositoryView, StatusView};
use commitwatch_core::domain::RepositoryId;
use commitwatch_core::error::Result;
use commitwatch_core::ports::{Clock, NotificationTarget, Notifier};
use commitwatch_core::tracking::{AddOutcome, RemoveOutcome, Tracker};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Handles commands from the outer surface (HTTP, chat bridge).
///
/// Shares the tracker with the reconciler; every command takes the lock for
/// one complete mutation, so a removal is fully applied, registry and
/// frontier both, before a running cycle can observe it.
pub struct AppService {
    tracker: Arc<Mutex<Tracker>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
}

impl AppService {
    pub fn new(tracker: Arc<Mutex<Tracker>>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            tracker,
            notifier,
            clock,
            started_at,
        }
    }

    /// Handle a command (CQRS Command side)
    pub async fn handle(&self, cmd: Command) -> Result<Reply> {
        match cmd {
            Command::AddRepository { id } => {
                let (id, outcome) = self.add_repository(&id).await?;
                Ok(Reply::Added { id, outcome })
            }
            Command::RemoveRepository { id } => {
                let (id, outcome) = self.remove_repository(&id).await?;
                Ok(Reply::Removed { id, outcome })
            }
            Command::ListRepositories => Ok(Reply::Repositories(self.list_repositories().await)),
            Command::SetNotificationTarget { target } => {
                self.set_notification_target(target.clone()).await;
                Ok(Reply::TargetSet(target))
            }
            Command::Status => Ok(Reply::Status(self.status().await)),
        }
    }

    pub async fn add_repository(&self, raw: &str) -> Result<(RepositoryId, AddOutcome)> {
        let (id, outcome) = self.tracker.lock().await.add(raw)?;
        info!(repo = %id, ?outcome, "add repository");
        Ok((id, outcome))
    }

    pub async fn remove_repository(&self, raw: &str) -> Result<(RepositoryId, RemoveOutcome)> {
        let id = RepositoryId::parse(raw)?;
        let outcome = self.tracker.lock().await.remove(&id)?;
        info!(repo = %id, ?outcome, "remove repository");
        Ok((id, outcome))
    }

    pub async fn list_repositories(&self) -> Vec<RepositoryView> {
        RepositoryView::collect(&*self.tracker.lock().await)
    }

    pub async fn set_notification_target(&self, target: NotificationTarget) {
        info!("notification target updated");
        self.notifier.set_target(target).await;
    }

    pub async fn status(&self) -> StatusView {
        let tracker = self.tracker.lock().await;
        StatusView::new(self.started_at, self.clock.now(), &tracker)
    }
}
