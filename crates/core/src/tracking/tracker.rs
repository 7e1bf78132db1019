use crate::domain::repo::{RegistryEntry, RepositoryId};
use crate::error::{CoreError, Result};
use crate::ports::persistence::{PersistedState, StateStore};
use std::sync::Arc;

use super::frontier::Frontier;
use super::registry::{AddOutcome, Registry, RemoveOutcome};

/// Registry and frontier bound to their durable store.
///
/// Every mutation rewrites the whole document before returning. When the
/// write fails the in-memory state is restored, so memory never runs ahead
/// of disk.
pub struct Tracker {
    registry: Registry,
    frontier: Frontier,
    store: Arc<dyn StateStore>,
    discarded: Vec<String>,
}

impl Tracker {
    /// Load stored state and merge in the locked set.
    ///
    /// Persists straight away when locked ids were inserted or nothing had
    /// been stored before.
    pub fn open(store: Arc<dyn StateStore>, locked: &[RepositoryId]) -> Result<Self> {
        let loaded = store.load().map_err(|source| CoreError::Persistence { source })?;
        let existed = loaded.is_some();

        let mut tracker = Self::from_persisted(store, loaded.unwrap_or_default());
        let inserted = tracker.registry.merge_locked(locked.iter().cloned());
        if inserted || !existed || !tracker.discarded.is_empty() {
            tracker.persist()?;
        }
        Ok(tracker)
    }

    fn from_persisted(store: Arc<dyn StateStore>, state: PersistedState) -> Self {
        let mut discarded = Vec::new();

        let ids = state.repos.into_iter().filter_map(|raw| match RepositoryId::parse(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                discarded.push(raw);
                None
            }
        });
        let registry = Registry::from_ids(ids.collect::<Vec<_>>());

        let mut frontier = Frontier::new();
        for (raw, sha) in state.last_commits {
            // Frontier entries for unmonitored ids would skip the silent
            // baseline if the id were added later
            match RepositoryId::parse(&raw) {
                Ok(id) if registry.contains(&id) => {
                    frontier.set(id, sha);
                }
                _ => discarded.push(raw),
            }
        }

        Self {
            registry,
            frontier,
            store,
            discarded,
        }
    }

    /// Stored ids dropped on load: malformed, or a frontier with no registry entry.
    pub fn discarded_on_load(&self) -> &[String] {
        &self.discarded
    }

    pub fn add(&mut self, raw: &str) -> Result<(RepositoryId, AddOutcome)> {
        let id = RepositoryId::parse(raw)?;
        let outcome = self.transact(|registry, _| {
            let outcome = registry.add(id.clone());
            (outcome, outcome == AddOutcome::Added)
        })?;
        Ok((id, outcome))
    }

    /// Remove `id` and discard its frontier, so a later re-add starts over
    /// with a silent first observation.
    pub fn remove(&mut self, id: &RepositoryId) -> Result<RemoveOutcome> {
        self.transact(|registry, frontier| {
            let outcome = registry.remove(id);
            if outcome == RemoveOutcome::Removed {
                frontier.remove(id);
            }
            (outcome, outcome == RemoveOutcome::Removed)
        })
    }

    pub fn merge_locked(&mut self, ids: &[RepositoryId]) -> Result<bool> {
        self.transact(|registry, _| {
            let inserted = registry.merge_locked(ids.iter().cloned());
            (inserted, inserted)
        })
    }

    /// Move the frontier of `id` to `sha` and persist it.
    pub fn advance(&mut self, id: &RepositoryId, sha: &str) -> Result<()> {
        self.transact(|_, frontier| ((), frontier.set(id.clone(), sha)))
    }

    pub fn frontier(&self, id: &RepositoryId) -> Option<&str> {
        self.frontier.get(id)
    }

    pub fn contains(&self, id: &RepositoryId) -> bool {
        self.registry.contains(id)
    }

    pub fn list(&self) -> Vec<RegistryEntry> {
        self.registry.list()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The document `save` would write for the current state.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            repos: self.registry.ids().iter().map(ToString::to_string).collect(),
            last_commits: self
                .frontier
                .iter()
                .map(|(id, sha)| (id.to_string(), sha.to_string()))
                .collect(),
        }
    }

    fn transact<T>(&mut self, apply: impl FnOnce(&mut Registry, &mut Frontier) -> (T, bool)) -> Result<T> {
        let registry = self.registry.clone();
        let frontier = self.frontier.clone();

        let (value, changed) = apply(&mut self.registry, &mut self.frontier);
        if changed {
            if let Err(err) = self.persist() {
                self.registry = registry;
                self.frontier = frontier;
                return Err(err);
            }
        }
        Ok(value)
    }

    fn persist(&self) -> Result<()> {
        self.store
            .save(&self.snapshot())
            .map_err(|source| CoreError::Persistence { source })
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("registry", &self.registry)
            .field("frontier", &self.frontier)
            .finish_non_exhaustive()
    }
}
