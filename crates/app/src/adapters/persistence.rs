use anyhow::{Context, Result};
use commitwatch_core::ports::{PersistedState, StateStore};
use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-based state store that implements StateStore.
///
/// The whole document is rewritten on every save through a sibling temp
/// file and a rename, so a crash mid-write leaves the previous document.
pub struct JsonStateStore {
    state_path: PathBuf,
}

impl JsonStateStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            state_path: Self::get_default_state_path()?,
        })
    }

    pub fn with_path<P: AsRef<Path>>(state_path: P) -> Self {
        Self {
            state_path: state_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.state_path
    }

    pub fn get_default_state_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "commitwatch")
            .context("Failed to determine project directories")?;

        Ok(proj_dirs.data_dir().join("commitwatch-state.json"))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .state_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.state_path.with_file_name(name)
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let contents = match fs::read_to_string(&self.state_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.state_path.display(), "no state file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read state file: {}", self.state_path.display())
                })
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(
                    path = %self.state_path.display(),
                    error = %e,
                    "state file is corrupted or empty, starting fresh"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create state directory")?;
            }
        }

        let contents =
            serde_json::to_string_pretty(state).context("Failed to serialize state to JSON")?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write state file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.state_path).with_context(|| {
            format!("Failed to replace state file: {}", self.state_path.display())
        })?;

        Ok(())
    }
}
