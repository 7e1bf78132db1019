use anyhow::{ensure, Context, Result};
use commitwatch_core::domain::RepositoryId;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::adapters::persistence::JsonStateStore;
use crate::cli::CliArgs;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    /// Tracking state document; defaults to the platform data directory
    pub state_file: Option<PathBuf>,
    pub poll_interval_secs: u64,
    /// Commits requested per repository per cycle
    pub fetch_limit: usize,
    /// Repositories fetched at once within a cycle
    pub fetch_concurrency: usize,
    pub log_level: String,
    /// Repositories that are always monitored and cannot be removed
    pub locked_repositories: Vec<String>,
    /// JSON file of the form `{ "default_repos": [...] }` adding to the locked set
    pub locked_repos_file: Option<PathBuf>,
    pub github: GitHubConfig,
    pub notify: NotifyConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct NotifyConfig {
    /// Initial webhook target; can be replaced at runtime
    pub webhook_url: Option<String>,
    pub dry_run: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            state_file: None,
            poll_interval_secs: 60,
            fetch_limit: 5,
            fetch_concurrency: 4,
            log_level: "info".to_string(),
            locked_repositories: Vec::new(),
            locked_repos_file: None,
            github: GitHubConfig::default(),
            notify: NotifyConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: 30,
            user_agent: "commitwatch".to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            dry_run: false,
            timeout_secs: 30,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "commitwatch")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("commitwatch.toml"))
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            // Create directory if it doesn't exist
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Secrets and deployment knobs from the environment override the file.
    pub fn apply_env(&mut self) {
        if let Some(token) = env_var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = env_var("COMMITWATCH_WEBHOOK_URL") {
            self.notify.webhook_url = Some(url);
        }
        if let Some(bind) = env_var("COMMITWATCH_BIND") {
            self.http.bind = bind;
        }
    }

    pub fn from_cli_and_file(cli_args: &CliArgs) -> Result<Self> {
        let mut config = Self::load(cli_args.config.clone())?;
        config.apply_env();

        // CLI args override config file and environment
        if let Some(state_file) = &cli_args.state_file {
            config.state_file = Some(state_file.clone());
        }
        if let Some(interval) = cli_args.interval {
            config.poll_interval_secs = interval;
        }
        if let Some(bind) = &cli_args.bind {
            config.http.bind = bind.clone();
        }
        if cli_args.dry_run {
            config.notify.dry_run = true;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.poll_interval_secs > 0, "poll_interval_secs must be at least 1");
        ensure!(self.fetch_limit > 0, "fetch_limit must be at least 1");
        ensure!(self.fetch_concurrency > 0, "fetch_concurrency must be at least 1");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => JsonStateStore::get_default_state_path(),
        }
    }

    /// The locked set: inline ids plus those in `locked_repos_file`.
    ///
    /// A malformed id is a configuration error.
    pub fn locked_ids(&self) -> Result<Vec<RepositoryId>> {
        let mut raw = self.locked_repositories.clone();
        if let Some(path) = &self.locked_repos_file {
            raw.extend(load_locked_file(path));
        }

        raw.iter()
            .map(|id| {
                RepositoryId::parse(id).with_context(|| format!("Invalid locked repository: {id}"))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct LockedReposFile {
    #[serde(default)]
    default_repos: Vec<String>,
}

/// Read a defaults file; a missing or unreadable file contributes nothing.
fn load_locked_file(path: &Path) -> Vec<String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "locked repos file not readable, using none");
            return Vec::new();
        }
    };

    match serde_json::from_str::<LockedReposFile>(&contents) {
        Ok(file) => file.default_repos,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse locked repos file, using none");
            Vec::new()
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
