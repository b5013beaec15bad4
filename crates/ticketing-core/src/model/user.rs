use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// What a user is allowed to do with tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reporter,
    Maintainer,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Reporter => "reporter",
            Self::Maintainer => "maintainer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = super::normalize(s);
        match normalized.as_str() {
            "reporter" => Ok(Self::Reporter),
            "maintainer" => Ok(Self::Maintainer),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

/// A registered user. The role set is fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    name: String,
    roles: BTreeSet<Role>,
    closed_count: u64,
}

impl User {
    pub(crate) fn new(name: impl Into<String>, roles: BTreeSet<Role>) -> Self {
        Self {
            name: name.into(),
            roles,
            closed_count: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Number of tickets closed while this user was the assigned maintainer.
    #[must_use]
    pub const fn closed_count(&self) -> u64 {
        self.closed_count
    }

    pub(crate) const fn record_closed(&mut self) {
        self.closed_count += 1;
    }
}
