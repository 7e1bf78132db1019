use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a hosted repository in `owner/name` form.
///
/// Compared as an exact string: case is never normalised, the hosting
/// platform decides whether two spellings name the same repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Validate and wrap an `owner/name` string.
    ///
    /// Exactly one `/` is allowed and both sides must be non-empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('/');
        let well_formed = match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) => !owner.is_empty() && !name.is_empty(),
            _ => false,
        };

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(CoreError::InvalidFormat { id: raw.to_string() })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.split().0
    }

    pub fn name(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // parse() guarantees exactly one separator
        self.0.split_once('/').unwrap_or((self.0.as_str(), ""))
    }
}

impl FromStr for RepositoryId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RepositoryId> for String {
    fn from(id: RepositoryId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One monitored repository as seen by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub id: RepositoryId,
    pub locked: bool,
}
