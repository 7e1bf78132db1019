use crate::app::queries::{RepositoryView, StatusView};
use crate::domain::repo::RepositoryId;
use crate::ports::notifier::NotificationTarget;
use crate::tracking::{AddOutcome, RemoveOutcome};

/// Commands that can be sent to the application service
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start monitoring a repository (`owner/name`)
    AddRepository { id: String },

    /// Stop monitoring a repository and forget its frontier
    RemoveRepository { id: String },

    /// List monitored repositories in insertion order
    ListRepositories,

    /// Point notifications at a new destination (not persisted)
    SetNotificationTarget { target: NotificationTarget },

    /// Report uptime and monitoring totals
    Status,
}

/// Replies produced by the application service
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Added { id: RepositoryId, outcome: AddOutcome },
    Removed { id: RepositoryId, outcome: RemoveOutcome },
    Repositories(Vec<RepositoryView>),
    TargetSet(NotificationTarget),
    Status(StatusView),
}
