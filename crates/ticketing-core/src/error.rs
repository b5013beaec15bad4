use std::fmt;

use crate::model::ticket::{State, TicketId};

/// Broad failure class, used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An entity with the same identity key already exists.
    Conflict,
    /// A lookup by key failed.
    NotFound,
    /// The entity exists but its state does not permit the operation.
    PreconditionFailed,
}

impl ErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::PreconditionFailed => "precondition_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DuplicateUser,
    DuplicateComponent,
    UnknownUser,
    UnknownComponent,
    UnknownTicket,
    NoParent,
    InvalidRoles,
    NotMaintainer,
    NotReporter,
    TicketClosed,
    NotAssigned,
    TicketNotClosed,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::DuplicateUser,
        Self::DuplicateComponent,
        Self::UnknownUser,
        Self::UnknownComponent,
        Self::UnknownTicket,
        Self::NoParent,
        Self::InvalidRoles,
        Self::NotMaintainer,
        Self::NotReporter,
        Self::TicketClosed,
        Self::NotAssigned,
        Self::TicketNotClosed,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateUser => "E1001",
            Self::DuplicateComponent => "E1002",
            Self::UnknownUser => "E2001",
            Self::UnknownComponent => "E2002",
            Self::UnknownTicket => "E2003",
            Self::NoParent => "E2004",
            Self::InvalidRoles => "E3001",
            Self::NotMaintainer => "E3002",
            Self::NotReporter => "E3003",
            Self::TicketClosed => "E3004",
            Self::NotAssigned => "E3005",
            Self::TicketNotClosed => "E3006",
        }
    }

    /// Failure class this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::DuplicateUser | Self::DuplicateComponent => ErrorKind::Conflict,
            Self::UnknownUser | Self::UnknownComponent | Self::UnknownTicket | Self::NoParent => {
                ErrorKind::NotFound
            }
            Self::InvalidRoles
            | Self::NotMaintainer
            | Self::NotReporter
            | Self::TicketClosed
            | Self::NotAssigned
            | Self::TicketNotClosed => ErrorKind::PreconditionFailed,
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DuplicateUser => "User already exists",
            Self::DuplicateComponent => "Component already exists",
            Self::UnknownUser => "User not found",
            Self::UnknownComponent => "Component not found",
            Self::UnknownTicket => "Ticket not found",
            Self::NoParent => "Component has no parent",
            Self::InvalidRoles => "At least one role is required",
            Self::NotMaintainer => "User is not a maintainer",
            Self::NotReporter => "User is not a reporter",
            Self::TicketClosed => "Ticket is closed",
            Self::NotAssigned => "Ticket is not assigned",
            Self::TicketNotClosed => "Ticket is not closed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DuplicateUser => Some("Pick a username that is not registered yet."),
            Self::DuplicateComponent => Some("Pick a name that is unused under this parent."),
            Self::UnknownUser => Some("Register the user before referring to it."),
            Self::UnknownComponent => Some("Define the component (and its parents) first."),
            Self::UnknownTicket => Some("Ticket ids start at 1 and follow creation order."),
            Self::NoParent => None,
            Self::InvalidRoles => Some("Pass reporter, maintainer, or both."),
            Self::NotMaintainer => Some("Assign tickets to a user holding the maintainer role."),
            Self::NotReporter => Some("Open tickets as a user holding the reporter role."),
            Self::TicketClosed => None,
            Self::NotAssigned => Some("Follow valid transitions: open -> assigned -> closed."),
            Self::TicketNotClosed => Some("Close the ticket before reading its resolution."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every failure the issue manager can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("component '{0}' already exists")]
    DuplicateComponent(String),

    #[error("user '{0}' not found")]
    UnknownUser(String),

    #[error("component '{0}' not found")]
    UnknownComponent(String),

    #[error("ticket {0} not found")]
    UnknownTicket(TicketId),

    #[error("component '{0}' is a root and has no parent")]
    NoParent(String),

    #[error("user '{0}' must have at least one role")]
    InvalidRoles(String),

    #[error("user '{0}' does not hold the maintainer role")]
    NotMaintainer(String),

    #[error("user '{0}' does not hold the reporter role")]
    NotReporter(String),

    #[error("ticket {0} is closed")]
    TicketClosed(TicketId),

    #[error("ticket {id} cannot be closed from state {state}")]
    NotAssigned { id: TicketId, state: State },

    #[error("ticket {id} has no resolution in state {state}")]
    TicketNotClosed { id: TicketId, state: State },
}

impl TicketError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateUser(_) => ErrorCode::DuplicateUser,
            Self::DuplicateComponent(_) => ErrorCode::DuplicateComponent,
            Self::UnknownUser(_) => ErrorCode::UnknownUser,
            Self::UnknownComponent(_) => ErrorCode::UnknownComponent,
            Self::UnknownTicket(_) => ErrorCode::UnknownTicket,
            Self::NoParent(_) => ErrorCode::NoParent,
            Self::InvalidRoles(_) => ErrorCode::InvalidRoles,
            Self::NotMaintainer(_) => ErrorCode::NotMaintainer,
            Self::NotReporter(_) => ErrorCode::NotReporter,
            Self::TicketClosed(_) => ErrorCode::TicketClosed,
            Self::NotAssigned { .. } => ErrorCode::NotAssigned,
            Self::TicketNotClosed { .. } => ErrorCode::TicketNotClosed,
        }
    }

    /// Failure class for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code().kind()
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type Result<T, E = TicketError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::{ErrorCode, ErrorKind, TicketError};
    use crate::model::ticket::{State, TicketId};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ErrorCode::ALL {
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn taxonomy_matches_failure_classes() {
        assert_eq!(
            TicketError::DuplicateUser("a".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            TicketError::DuplicateComponent("/a".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            TicketError::NoParent("/a".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TicketError::UnknownTicket(TicketId::new(9)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TicketError::NotAssigned {
                id: TicketId::new(1),
                state: State::Open,
            }
            .kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            TicketError::InvalidRoles("a".into()).kind(),
            ErrorKind::PreconditionFailed
        );
    }

    #[test]
    fn display_names_the_offending_key() {
        let err = TicketError::NotAssigned {
            id: TicketId::new(3),
            state: State::Open,
        };
        assert_eq!(err.to_string(), "ticket 3 cannot be closed from state open");
        assert_eq!(
            TicketError::UnknownComponent("/System/Nope".into()).to_string(),
            "component '/System/Nope' not found"
        );
    }
}
