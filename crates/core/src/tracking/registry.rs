use crate::domain::repo::{RegistryEntry, RepositoryId};
use serde::Serialize;
use std::collections::HashSet;

/// Result of adding a repository to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Result of removing a repository from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
    Locked,
}

/// Ordered set of monitored repositories.
///
/// Locked membership comes from configuration and is never persisted; a
/// locked id cannot be removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RepositoryId>,
    locked: HashSet<RepositoryId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored ids, dropping duplicates but keeping first-seen order.
    pub fn from_ids(ids: impl IntoIterator<Item = RepositoryId>) -> Self {
        let mut registry = Self::new();
        for id in ids {
            registry.add(id);
        }
        registry
    }

    pub fn add(&mut self, id: RepositoryId) -> AddOutcome {
        if self.contains(&id) {
            return AddOutcome::AlreadyPresent;
        }
        self.entries.push(id);
        AddOutcome::Added
    }

    pub fn remove(&mut self, id: &RepositoryId) -> RemoveOutcome {
        let Some(pos) = self.entries.iter().position(|e| e == id) else {
            return RemoveOutcome::NotPresent;
        };
        if self.locked.contains(id) {
            return RemoveOutcome::Locked;
        }
        self.entries.remove(pos);
        RemoveOutcome::Removed
    }

    /// Mark `ids` as locked, inserting any that are missing.
    ///
    /// Idempotent. Returns true if the member list changed (lock flags alone
    /// are not stored, so they do not count as a change).
    pub fn merge_locked(&mut self, ids: impl IntoIterator<Item = RepositoryId>) -> bool {
        let mut inserted = false;
        for id in ids {
            if self.add(id.clone()) == AddOutcome::Added {
                inserted = true;
            }
            self.locked.insert(id);
        }
        inserted
    }

    pub fn list(&self) -> Vec<RegistryEntry> {
        self.entries
            .iter()
            .map(|id| RegistryEntry {
                id: id.clone(),
                locked: self.is_locked(id),
            })
            .collect()
    }

    pub fn ids(&self) -> &[RepositoryId] {
        &self.entries
    }

    pub fn contains(&self, id: &RepositoryId) -> bool {
        self.entries.contains(id)
    }

    pub fn is_locked(&self, id: &RepositoryId) -> bool {
        self.locked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
