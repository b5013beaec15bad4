use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// Sequential ticket identifier; the first ticket is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Zero-based position in the ticket store, if the id is in range at all.
    pub(crate) fn slot(self) -> Option<usize> {
        self.0
            .checked_sub(1)
            .and_then(|slot| usize::try_from(slot).ok())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self).map_err(|_| ParseEnumError {
            expected: "ticket id",
            got: s.to_string(),
        })
    }
}

/// Ticket urgency. Declaration order is the natural order: `Blocking` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocking,
    Critical,
    Major,
    Minor,
    Cosmetic,
}

impl Severity {
    /// Every severity in natural order.
    pub const ALL: [Self; 5] = [
        Self::Blocking,
        Self::Critical,
        Self::Major,
        Self::Minor,
        Self::Cosmetic,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Cosmetic => "cosmetic",
        }
    }
}

/// The three lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Open,
    Assigned,
    Closed,
}

impl State {
    /// Every state in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Open, Self::Assigned, Self::Closed];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::Closed => "closed",
        }
    }

    /// Validate whether a transition from self to `target` is allowed.
    ///
    /// Valid transitions:
    /// - `open -> assigned`
    /// - `assigned -> assigned` (reassignment)
    /// - `assigned -> closed`
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for every other pair.
    pub const fn can_transition_to(self, target: Self) -> Result<(), InvalidTransition> {
        match (self, target) {
            (Self::Open | Self::Assigned, Self::Assigned) | (Self::Assigned, Self::Closed) => {
                Ok(())
            }
            (Self::Closed, _) => Err(InvalidTransition {
                from: self,
                to: target,
                reason: "closed is terminal",
            }),
            _ => Err(InvalidTransition {
                from: self,
                to: target,
                reason: "transition not allowed by lifecycle rules",
            }),
        }
    }
}

/// Error returned when a state transition is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: State,
    pub to: State,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.reason)
    }
}

impl std::error::Error for InvalidTransition {}

/// A reported issue against a component.
///
/// Tickets are created by the issue manager and only change through its
/// assign/close operations, so fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    id: TicketId,
    author: String,
    component: String,
    description: String,
    severity: Severity,
    state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    maintainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
}

impl Ticket {
    pub(crate) fn new(
        id: TicketId,
        author: impl Into<String>,
        component: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            component: component.into(),
            description: description.into(),
            severity,
            state: State::Open,
            maintainer: None,
            resolution: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Username of the reporter.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Full path of the component the ticket was filed against.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Maintainer currently responsible for the ticket.
    #[must_use]
    pub fn maintainer(&self) -> Option<&str> {
        self.maintainer.as_deref()
    }

    /// Resolution text; only present once the ticket is closed.
    #[must_use]
    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub(crate) fn assign(&mut self, maintainer: &str) -> Result<(), InvalidTransition> {
        self.state.can_transition_to(State::Assigned)?;
        self.maintainer = Some(maintainer.to_string());
        self.state = State::Assigned;
        Ok(())
    }

    /// Close the ticket, returning the maintainer to credit.
    pub(crate) fn close(&mut self, resolution: &str) -> Result<Option<&str>, InvalidTransition> {
        self.state.can_transition_to(State::Closed)?;
        self.resolution = Some(resolution.to_string());
        self.state = State::Closed;
        Ok(self.maintainer.as_deref())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = super::normalize(s);
        match normalized.as_str() {
            "blocking" => Ok(Self::Blocking),
            "critical" => Ok(Self::Critical),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "cosmetic" => Ok(Self::Cosmetic),
            _ => Err(ParseEnumError {
                expected: "severity",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for State {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = super::normalize(s);
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError {
                expected: "state",
                got: s.to_string(),
            }),
        }
    }
}
