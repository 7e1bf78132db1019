use crate::domain::commit::Commit;

/// Decision for one repository given a fresh fetch and its frontier.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Nothing was fetched; leave everything as it is.
    Skip,

    /// First observation: record `sha` and announce nothing.
    Baseline { sha: String },

    /// The newest fetched commit is the frontier.
    Unchanged,

    /// Announce `commits` (oldest first), then move the frontier to `latest`.
    ///
    /// `gap` means the old frontier was not inside the fetched window, so
    /// anything older than the window is never announced.
    Announce {
        commits: Vec<Commit>,
        latest: String,
        gap: bool,
    },
}

/// Compare a newest-first fetch against the stored frontier.
pub fn plan(fetched: Vec<Commit>, frontier: Option<&str>) -> Plan {
    let Some(latest) = fetched.first().map(|c| c.sha.clone()) else {
        return Plan::Skip;
    };

    let Some(frontier) = frontier else {
        return Plan::Baseline { sha: latest };
    };

    if frontier == latest {
        return Plan::Unchanged;
    }

    let mut gap = true;
    let mut commits = Vec::with_capacity(fetched.len());
    for commit in fetched {
        if commit.sha == frontier {
            gap = false;
            break;
        }
        commits.push(commit);
    }
    commits.reverse();

    Plan::Announce { commits, latest, gap }
}
