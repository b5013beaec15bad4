//! Aggregate views over users and tickets.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::ticket::{Severity, State, Ticket};
use crate::model::user::User;

/// One row of the maintainer ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintainerStanding {
    pub username: String,
    pub closed: u64,
}

impl fmt::Display for MaintainerStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.username, self.closed)
    }
}

/// Rank every user by closed tickets (descending), then username (ascending).
///
/// Users without the maintainer role are included with their count of zero.
pub fn rank_maintainers<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<MaintainerStanding> {
    let mut ranked: Vec<&User> = users.into_iter().collect();
    ranked.sort_by(|a, b| {
        Reverse(a.closed_count())
            .cmp(&Reverse(b.closed_count()))
            .then_with(|| a.name().cmp(b.name()))
    });
    ranked
        .into_iter()
        .map(|user| MaintainerStanding {
            username: user.name().to_string(),
            closed: user.closed_count(),
        })
        .collect()
}

/// Snapshot of everything the tracker reports on.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerSummary {
    pub tickets: Vec<Ticket>,
    pub by_state: BTreeMap<State, usize>,
    pub open_by_severity: BTreeMap<Severity, usize>,
    pub all_by_severity: BTreeMap<Severity, usize>,
    pub top_maintainers: Vec<MaintainerStanding>,
}

#[cfg(test)]
mod tests {
    use super::{MaintainerStanding, rank_maintainers};
    use crate::model::user::{Role, User};
    use std::collections::BTreeSet;

    fn user(name: &str, closed: u64) -> User {
        let mut user = User::new(name, BTreeSet::from([Role::Maintainer]));
        for _ in 0..closed {
            user.record_closed();
        }
        user
    }

    #[test]
    fn standing_renders_name_and_count() {
        let standing = MaintainerStanding {
            username: "delta".into(),
            closed: 3,
        };
        assert_eq!(standing.to_string(), "delta: 3");
    }

    #[test]
    fn ranking_sorts_by_count_then_name() {
        let users = [
            user("zeta", 1),
            user("beta", 0),
            user("alpha", 0),
            user("eta", 1),
            user("mu", 4),
        ];
        let rendered: Vec<String> = rank_maintainers(&users)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec!["mu: 4", "eta: 1", "zeta: 1", "alpha: 0", "beta: 0"]
        );
    }

    #[test]
    fn ranking_of_nobody_is_empty() {
        assert!(rank_maintainers(&[] as &[User]).is_empty());
    }
}
