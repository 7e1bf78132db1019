use anyhow::Result;
use async_trait::async_trait;
use commitwatch_core::domain::{Commit, RepositoryId};
use commitwatch_core::ports::{NotificationTarget, Notifier};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

const EMBED_COLOR: u32 = 0x0366D6;
const DESCRIPTION_LIMIT: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("no notification target configured")]
    NoTarget,

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Notifier that posts a Discord-style embed to a webhook URL.
///
/// The target lives in memory only; it is lost on restart.
pub struct WebhookNotifier {
    client: Client,
    target: RwLock<Option<NotificationTarget>>,
}

impl WebhookNotifier {
    pub fn new(target: Option<NotificationTarget>, timeout_secs: u64) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            target: RwLock::new(target),
        })
    }

    pub async fn target(&self) -> Option<NotificationTarget> {
        self.target.read().await.clone()
    }

    async fn post(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let target = self.target().await.ok_or(WebhookError::NoTarget)?;

        let response = self.client.post(&target.0).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn destination_ready(&self) -> bool {
        self.target.read().await.is_some()
    }

    async fn set_target(&self, target: NotificationTarget) {
        *self.target.write().await = Some(target);
    }

    async fn notify(&self, repo: &RepositoryId, commit: &Commit) -> Result<()> {
        let payload = WebhookPayload {
            embeds: vec![Embed::for_commit(repo, commit)],
        };
        self.post(&payload).await?;
        debug!(repo = %repo, sha = %commit.short_sha(), "notification delivered");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    url: String,
    color: u32,
    description: String,
    timestamp: String,
    author: EmbedAuthor,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

impl Embed {
    fn for_commit(repo: &RepositoryId, commit: &Commit) -> Self {
        Self {
            title: format!("New commit to {repo}"),
            url: commit.html_url.clone(),
            color: EMBED_COLOR,
            description: commit.truncated_message(DESCRIPTION_LIMIT),
            timestamp: commit.timestamp.to_rfc3339(),
            author: EmbedAuthor {
                name: commit.author.name.clone(),
                icon_url: commit.author.avatar_url.clone(),
            },
            fields: vec![EmbedField {
                name: "SHA".to_string(),
                value: format!("`{}`", commit.short_sha()),
                inline: true,
            }],
            footer: EmbedFooter {
                text: format!("Repository: {repo}"),
            },
        }
    }
}
