use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commitwatch_core::domain::{Author, Commit, RepositoryId};
use commitwatch_core::ports::CommitSource;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::GitHubConfig;

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// CommitSource backed by the GitHub REST API.
///
/// One request per call and no retries: a failed fetch waits for the next
/// poll cycle.
#[derive(Clone)]
pub struct GitHubCommitSource {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubCommitSource {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    async fn list_commits(&self, id: &RepositoryId, limit: usize) -> Result<Vec<Commit>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/commits",
            self.api_base,
            id.owner(),
            id.name()
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("per_page", limit)])
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, body });
        }

        let commits = response.json::<Vec<ApiCommit>>().await?;
        debug!(repo = %id, count = commits.len(), "github returned commits");

        Ok(commits.into_iter().take(limit).map(Commit::from).collect())
    }
}

#[async_trait]
impl CommitSource for GitHubCommitSource {
    async fn fetch(&self, id: &RepositoryId, limit: usize) -> Result<Vec<Commit>> {
        Ok(self.list_commits(id, limit).await?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    html_url: String,
    commit: ApiCommitDetail,
    /// Linked platform account; null when the author email is unknown
    author: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    avatar_url: Option<String>,
}

impl From<ApiCommit> for Commit {
    fn from(api: ApiCommit) -> Self {
        let signature = api.commit.author.or(api.commit.committer);
        let (name, timestamp) = match signature {
            Some(sig) => (sig.name, sig.date),
            None => ("unknown".to_string(), DateTime::<Utc>::default()),
        };

        Commit {
            sha: api.sha,
            message: api.commit.message,
            author: Author {
                name,
                avatar_url: api.author.and_then(|u| u.avatar_url).filter(|u| !u.is_empty()),
            },
            timestamp,
            html_url: api.html_url,
        }
    }
}
