//! ticketing-core library.
//!
//! An in-memory issue tracker: users with roles, a tree of components
//! addressed by slash-delimited paths, and tickets that move through
//! `open -> assigned -> closed`.
//!
//! # Conventions
//!
//! - **Errors**: domain operations return [`error::Result`] with a
//!   [`error::TicketError`]; config loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!` for state changes, `debug!`
//!   for lookups and rejected operations).

pub mod components;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod report;
pub mod tickets;
pub mod users;

pub use error::{ErrorCode, ErrorKind, TicketError};
pub use manager::{IssueManager, IssuePolicy};
pub use model::ticket::{Severity, State, Ticket, TicketId};
pub use model::user::{Role, User};
