use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as reported by the hosting platform.
///
/// Identity is the sha; every other field is display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub html_url: String,
}

/// Commit author information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl Commit {
    /// Abbreviated sha for display.
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }

    /// Commit message cut to at most `max_chars` characters.
    pub fn truncated_message(&self, max_chars: usize) -> String {
        self.message.chars().take(max_chars).collect()
    }
}

/// First seven characters of a sha, or the whole string if shorter.
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}
