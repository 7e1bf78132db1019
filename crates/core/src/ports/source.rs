use crate::domain::{commit::Commit, repo::RepositoryId};
use anyhow::Result;
use async_trait::async_trait;

/// Port for reading recent commits from the hosting platform
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Fetch at most `limit` commits, newest first.
    ///
    /// `Ok(vec![])` and `Err(_)` are treated alike by callers; the error only
    /// carries detail for logging.
    async fn fetch(&self, id: &RepositoryId, limit: usize) -> Result<Vec<Commit>>;
}
