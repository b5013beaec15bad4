//! Append-only ticket store.
//!
//! Tickets are kept densely in creation order, so a ticket's id is its
//! one-based position. Nothing is ever removed or reordered in place; sorted
//! views are returned as fresh vectors.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TicketError};
use crate::model::ticket::{Severity, State, Ticket, TicketId};

#[derive(Debug, Default, Clone)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
}

impl TicketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new `open` ticket and return its id (the new store size).
    pub fn open(
        &mut self,
        author: &str,
        component: &str,
        description: &str,
        severity: Severity,
    ) -> TicketId {
        let id = TicketId::new(self.tickets.len() as u64 + 1);
        debug!(ticket = %id, author, component, %severity, "appending ticket");
        self.tickets
            .push(Ticket::new(id, author, component, description, severity));
        id
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownTicket`] for ids outside `1..=len`.
    pub fn get(&self, id: TicketId) -> Result<&Ticket> {
        id.slot()
            .and_then(|slot| self.tickets.get(slot))
            .ok_or(TicketError::UnknownTicket(id))
    }

    pub(crate) fn get_mut(&mut self, id: TicketId) -> Result<&mut Ticket> {
        id.slot()
            .and_then(|slot| self.tickets.get_mut(slot))
            .ok_or(TicketError::UnknownTicket(id))
    }

    /// All tickets ordered by severity; ties keep creation order.
    #[must_use]
    pub fn sorted_by_severity(&self) -> Vec<&Ticket> {
        let mut sorted: Vec<&Ticket> = self.tickets.iter().collect();
        sorted.sort_by_key(|ticket| ticket.severity());
        sorted
    }

    /// Count tickets per severity, optionally only those in `state`.
    ///
    /// Severities with no matching tickets are absent from the map.
    #[must_use]
    pub fn count_by_severity(&self, state: Option<State>) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for ticket in self
            .tickets
            .iter()
            .filter(|ticket| state.is_none_or(|wanted| ticket.state() == wanted))
        {
            *counts.entry(ticket.severity()).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn count_by_state(&self) -> BTreeMap<State, usize> {
        let mut counts = BTreeMap::new();
        for ticket in &self.tickets {
            *counts.entry(ticket.state()).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
