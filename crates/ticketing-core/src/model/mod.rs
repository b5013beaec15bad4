//! Domain types: users and roles, tickets with their severity and lifecycle.

pub mod ticket;
pub mod user;

use std::fmt;

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
