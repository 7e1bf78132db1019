use crate::domain::repo::RepositoryId;
use std::collections::HashMap;

/// Last announced sha per repository. Absent means never observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    shas: HashMap<RepositoryId, String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &RepositoryId) -> Option<&str> {
        self.shas.get(id).map(String::as_str)
    }

    /// Overwrite the sha for `id`. Returns true if the value changed.
    pub fn set(&mut self, id: RepositoryId, sha: impl Into<String>) -> bool {
        let sha = sha.into();
        if self.get(&id) == Some(sha.as_str()) {
            return false;
        }
        self.shas.insert(id, sha);
        true
    }

    pub fn remove(&mut self, id: &RepositoryId) -> Option<String> {
        self.shas.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryId, &str)> {
        self.shas.iter().map(|(id, sha)| (id, sha.as_str()))
    }

    pub fn len(&self) -> usize {
        self.shas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shas.is_empty()
    }
}
