use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable store for the registry and frontier document
pub trait StateStore: Send + Sync {
    /// Load the stored document, `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedState>>;

    /// Replace the stored document in full.
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// On-disk shape of the tracking state.
///
/// Locked flags are not stored; they are derived from configuration at load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Monitored repository ids in insertion order
    #[serde(default)]
    pub repos: Vec<String>,

    /// Last announced sha per repository id
    #[serde(default)]
    pub last_commits: BTreeMap<String, String>,
}

/// In-memory `StateStore`, for tests and ephemeral runs.
///
/// Saves can be made to fail on demand to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: std::sync::Mutex<Option<PersistedState>>,
    fail_saves: std::sync::atomic::AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: std::sync::Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// Make every following `save` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// The last successfully saved document.
    pub fn stored(&self) -> Option<PersistedState> {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| anyhow::anyhow!("memory state store poisoned"))
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_saves.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("simulated write failure");
        }
        let mut slot = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("memory state store poisoned"))?;
        *slot = Some(state.clone());
        Ok(())
    }
}
