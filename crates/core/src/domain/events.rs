use super::repo::RepositoryId;

/// What one reconciliation pass decided for a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// First observation: the frontier was set without announcing anything.
    Baseline { sha: String },

    /// The latest fetched commit already matches the frontier.
    Unchanged,

    /// New commits were announced and the frontier advanced.
    ///
    /// `failed` counts notifications the notifier rejected; `gap` is set
    /// when the old frontier was outside the fetch window.
    Announced { count: usize, failed: usize, gap: bool },

    /// The fetch failed or returned nothing; nothing changed.
    Skipped,

    /// The repository was removed while its fetch was in flight.
    Dropped,

    /// The frontier could not be persisted; it will be retried next cycle.
    PersistenceFailed,
}

/// Outcomes of one full pass over the registry.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub outcomes: Vec<(RepositoryId, RepoOutcome)>,
}

impl CycleReport {
    pub fn record(&mut self, id: RepositoryId, outcome: RepoOutcome) {
        self.outcomes.push((id, outcome));
    }

    pub fn outcome(&self, id: &RepositoryId) -> Option<&RepoOutcome> {
        self.outcomes
            .iter()
            .find(|(repo, _)| repo == id)
            .map(|(_, outcome)| outcome)
    }

    /// Total number of commits announced across all repositories.
    pub fn announced(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                RepoOutcome::Announced { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RepoOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RepoOutcome::PersistenceFailed))
    }

    fn count(&self, pred: impl Fn(&RepoOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}
