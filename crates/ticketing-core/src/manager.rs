//! The issue manager facade.
//!
//! Callers only talk to [`IssueManager`]. It owns the user registry, the
//! component tree and the ticket store, and enforces the rules that span
//! them: role checks, component existence, and legal state transitions.
//!
//! # Lifecycle
//!
//! ```text
//! open --assign--> assigned --close--> closed
//!                   |    ^
//!                   +----+ (reassign)
//! ```
//!
//! A failed operation never leaves partial changes behind.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::components::{Component, ComponentTree};
use crate::config::ProjectConfig;
use crate::error::{Result, TicketError};
use crate::model::ticket::{Severity, State, Ticket, TicketId};
use crate::model::user::{Role, User};
use crate::report::{self, MaintainerStanding, TrackerSummary};
use crate::tickets::TicketStore;
use crate::users::UserRegistry;

/// Optional checks layered on top of the always-enforced rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssuePolicy {
    /// Only users holding [`Role::Reporter`] may open tickets.
    ///
    /// Off by default: any registered user may open a ticket.
    pub require_reporter_role: bool,
}

impl IssuePolicy {
    /// Map project-level config into a policy.
    #[must_use]
    pub const fn from_project_config(config: &ProjectConfig) -> Self {
        Self {
            require_reporter_role: config.policy.require_reporter_role,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct IssueManager {
    users: UserRegistry,
    components: ComponentTree,
    tickets: TicketStore,
    policy: IssuePolicy,
}

impl IssueManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: IssuePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn policy(&self) -> IssuePolicy {
        self.policy
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// [`TicketError::DuplicateUser`], [`TicketError::InvalidRoles`].
    pub fn register_user<I>(&mut self, username: &str, roles: I) -> Result<()>
    where
        I: IntoIterator<Item = Role>,
    {
        self.users.register(username, roles)?;
        info!(user = username, "user registered");
        Ok(())
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownUser`].
    pub fn roles_of(&self, username: &str) -> Result<&BTreeSet<Role>> {
        self.users.roles_of(username)
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownUser`].
    pub fn user(&self, username: &str) -> Result<&User> {
        self.users.get(username)
    }

    /// Tickets closed by `username` while acting as maintainer.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownUser`].
    pub fn closed_count_of(&self, username: &str) -> Result<u64> {
        self.users.get(username).map(User::closed_count)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// [`TicketError::DuplicateComponent`].
    pub fn define_root_component(&mut self, name: &str) -> Result<&Component> {
        let component = self.components.define_root(name)?;
        info!(component = component.path(), "component defined");
        Ok(component)
    }

    /// # Errors
    ///
    /// [`TicketError::DuplicateComponent`], [`TicketError::UnknownComponent`].
    pub fn define_child_component(&mut self, name: &str, parent_path: &str) -> Result<&Component> {
        let component = self.components.define_child(name, parent_path)?;
        info!(component = component.path(), "component defined");
        Ok(component)
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownComponent`].
    pub fn children_of(&self, path: &str) -> Result<BTreeSet<String>> {
        self.components.children_of(path)
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownComponent`], [`TicketError::NoParent`].
    pub fn parent_of(&self, path: &str) -> Result<&str> {
        self.components.parent_of(path)
    }

    #[must_use]
    pub const fn components(&self) -> &ComponentTree {
        &self.components
    }

    // ---------------------------------------------------------------------
    // Tickets
    // ---------------------------------------------------------------------

    /// Open a ticket against `component_path` and return its id.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownUser`], [`TicketError::UnknownComponent`], and
    /// [`TicketError::NotReporter`] when the policy requires the role.
    pub fn open_ticket(
        &mut self,
        username: &str,
        component_path: &str,
        description: &str,
        severity: Severity,
    ) -> Result<TicketId> {
        if self.policy.require_reporter_role {
            self.users.require_role(username, Role::Reporter)?;
        } else {
            self.users.get(username)?;
        }
        let component = self.components.get(component_path)?;

        let id = self
            .tickets
            .open(username, component.path(), description, severity);
        info!(
            ticket = %id,
            user = username,
            component = component_path,
            %severity,
            "ticket opened"
        );
        Ok(id)
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownTicket`].
    pub fn ticket(&self, id: TicketId) -> Result<&Ticket> {
        self.tickets.get(id)
    }

    /// Assign (or reassign) a ticket to a maintainer.
    ///
    /// The user is checked before the ticket.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownUser`], [`TicketError::NotMaintainer`],
    /// [`TicketError::UnknownTicket`], [`TicketError::TicketClosed`].
    pub fn assign_ticket(&mut self, id: TicketId, username: &str) -> Result<()> {
        self.users.require_role(username, Role::Maintainer)?;
        let ticket = self.tickets.get_mut(id)?;

        let previous = ticket.maintainer().map(str::to_string);
        if let Err(transition) = ticket.assign(username) {
            debug!(ticket = %id, %transition, "assign rejected");
            return Err(TicketError::TicketClosed(id));
        }
        info!(
            ticket = %id,
            maintainer = username,
            previous = previous.as_deref(),
            "ticket assigned"
        );
        Ok(())
    }

    /// Close an assigned ticket and credit its maintainer.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownTicket`], [`TicketError::NotAssigned`] unless the
    /// ticket is currently `assigned`.
    pub fn close_ticket(&mut self, id: TicketId, resolution: &str) -> Result<()> {
        let ticket = self.tickets.get_mut(id)?;
        let state = ticket.state();
        let credited = match ticket.close(resolution) {
            Ok(maintainer) => maintainer.map(str::to_string),
            Err(transition) => {
                debug!(ticket = %id, %transition, "close rejected");
                return Err(TicketError::NotAssigned { id, state });
            }
        };

        // An assigned ticket always carries a maintainer registered as a user.
        if let Some(maintainer) = credited.as_deref() {
            self.users.get_mut(maintainer)?.record_closed();
        }
        info!(ticket = %id, maintainer = credited.as_deref(), "ticket closed");
        Ok(())
    }

    /// Resolution text of a closed ticket.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownTicket`], [`TicketError::TicketNotClosed`].
    pub fn resolution_of(&self, id: TicketId) -> Result<&str> {
        let ticket = self.tickets.get(id)?;
        ticket.resolution().ok_or(TicketError::TicketNotClosed {
            id,
            state: ticket.state(),
        })
    }

    // ---------------------------------------------------------------------
    // Reports
    // ---------------------------------------------------------------------

    /// All tickets ordered by severity, ties in creation order.
    #[must_use]
    pub fn all_tickets_by_severity(&self) -> Vec<&Ticket> {
        self.tickets.sorted_by_severity()
    }

    /// Ticket counts per severity; `None` counts every ticket.
    #[must_use]
    pub fn count_by_severity(&self, state: Option<State>) -> BTreeMap<Severity, usize> {
        self.tickets.count_by_severity(state)
    }

    #[must_use]
    pub fn count_by_state(&self) -> BTreeMap<State, usize> {
        self.tickets.count_by_state()
    }

    /// `"username: count"` for every user, most closed tickets first.
    #[must_use]
    pub fn top_maintainers(&self) -> Vec<String> {
        self.maintainer_standings()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[must_use]
    pub fn maintainer_standings(&self) -> Vec<MaintainerStanding> {
        report::rank_maintainers(self.users.iter())
    }

    #[must_use]
    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            tickets: self
                .all_tickets_by_severity()
                .into_iter()
                .cloned()
                .collect(),
            by_state: self.count_by_state(),
            open_by_severity: self.count_by_severity(Some(State::Open)),
            all_by_severity: self.count_by_severity(None),
            top_maintainers: self.maintainer_standings(),
        }
    }

    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{IssueManager, IssuePolicy};
    use crate::config::{PolicyConfig, ProjectConfig};
    use crate::error::TicketError;
    use crate::model::ticket::{Severity, State, TicketId};
    use crate::model::user::Role;

    fn manager() -> IssueManager {
        let mut im = IssueManager::new();
        im.register_user("alpha", [Role::Reporter]).unwrap();
        im.register_user("gamma", [Role::Reporter, Role::Maintainer])
            .unwrap();
        im.register_user("delta", [Role::Maintainer]).unwrap();
        im.define_root_component("System").unwrap();
        im.define_child_component("SubA", "/System").unwrap();
        im
    }

    #[test]
    fn open_assign_close_round_trip() {
        let mut im = manager();
        let id = im
            .open_ticket("alpha", "/System/SubA", "menu broken", Severity::Major)
            .unwrap();
        assert_eq!(id, TicketId::new(1));
        assert_eq!(im.ticket(id).unwrap().component(), "/System/SubA");

        im.assign_ticket(id, "delta").unwrap();
        assert_eq!(im.ticket(id).unwrap().state(), State::Assigned);
        assert_eq!(im.ticket(id).unwrap().maintainer(), Some("delta"));

        im.close_ticket(id, "fixed").unwrap();
        assert_eq!(im.ticket(id).unwrap().state(), State::Closed);
        assert_eq!(im.resolution_of(id).unwrap(), "fixed");
        assert_eq!(im.closed_count_of("delta").unwrap(), 1);
    }

    #[test]
    fn open_requires_known_user_and_component() {
        let mut im = manager();
        assert_eq!(
            im.open_ticket("ghost", "/System", "x", Severity::Minor)
                .unwrap_err(),
            TicketError::UnknownUser("ghost".into())
        );
        assert_eq!(
            im.open_ticket("alpha", "/System/SubZ", "x", Severity::Minor)
                .unwrap_err(),
            TicketError::UnknownComponent("/System/SubZ".into())
        );
        assert_eq!(im.ticket_count(), 0);
    }

    #[test]
    fn lenient_policy_lets_maintainers_open_tickets() {
        let mut im = manager();
        assert!(
            im.open_ticket("delta", "/System", "x", Severity::Minor)
                .is_ok()
        );
    }

    #[test]
    fn strict_policy_requires_reporter_role() {
        let config = ProjectConfig {
            policy: PolicyConfig {
                require_reporter_role: true,
            },
        };
        let mut im = IssueManager::with_policy(IssuePolicy::from_project_config(&config));
        im.register_user("delta", [Role::Maintainer]).unwrap();
        im.register_user("alpha", [Role::Reporter]).unwrap();
        im.define_root_component("System").unwrap();

        assert_eq!(
            im.open_ticket("delta", "/System", "x", Severity::Minor)
                .unwrap_err(),
            TicketError::NotReporter("delta".into())
        );
        assert!(
            im.open_ticket("alpha", "/System", "x", Severity::Minor)
                .is_ok()
        );
    }

    #[test]
    fn assign_checks_user_before_ticket() {
        let mut im = manager();
        // unknown ticket, but the user problem is reported first
        assert_eq!(
            im.assign_ticket(TicketId::new(5), "alpha").unwrap_err(),
            TicketError::NotMaintainer("alpha".into())
        );
        assert_eq!(
            im.assign_ticket(TicketId::new(5), "ghost").unwrap_err(),
            TicketError::UnknownUser("ghost".into())
        );
        assert_eq!(
            im.assign_ticket(TicketId::new(5), "delta").unwrap_err(),
            TicketError::UnknownTicket(TicketId::new(5))
        );
    }

    #[test]
    fn reassignment_moves_credit_to_latest_maintainer() {
        let mut im = manager();
        let id = im
            .open_ticket("alpha", "/System", "x", Severity::Critical)
            .unwrap();
        im.assign_ticket(id, "gamma").unwrap();
        im.assign_ticket(id, "delta").unwrap();
        im.assign_ticket(id, "delta").unwrap();
        im.close_ticket(id, "done").unwrap();

        assert_eq!(im.closed_count_of("delta").unwrap(), 1);
        assert_eq!(im.closed_count_of("gamma").unwrap(), 0);
    }

    #[test]
    fn closed_ticket_rejects_assign_and_close() {
        let mut im = manager();
        let id = im
            .open_ticket("alpha", "/System", "x", Severity::Critical)
            .unwrap();
        im.assign_ticket(id, "delta").unwrap();
        im.close_ticket(id, "done").unwrap();

        assert_eq!(
            im.assign_ticket(id, "gamma").unwrap_err(),
            TicketError::TicketClosed(id)
        );
        assert_eq!(
            im.close_ticket(id, "again").unwrap_err(),
            TicketError::NotAssigned {
                id,
                state: State::Closed
            }
        );
        assert_eq!(im.resolution_of(id).unwrap(), "done");
        assert_eq!(im.ticket(id).unwrap().maintainer(), Some("delta"));
        assert_eq!(im.closed_count_of("delta").unwrap(), 1);
    }

    #[test]
    fn closing_open_ticket_fails_and_changes_nothing() {
        let mut im = manager();
        let id = im
            .open_ticket("alpha", "/System", "x", Severity::Minor)
            .unwrap();
        assert_eq!(
            im.close_ticket(id, "nope").unwrap_err(),
            TicketError::NotAssigned {
                id,
                state: State::Open
            }
        );
        let ticket = im.ticket(id).unwrap();
        assert_eq!(ticket.state(), State::Open);
        assert!(ticket.resolution().is_none());
        assert_eq!(
            im.resolution_of(id).unwrap_err(),
            TicketError::TicketNotClosed {
                id,
                state: State::Open
            }
        );
    }

    #[test]
    fn close_unknown_ticket_is_not_found() {
        let mut im = manager();
        assert_eq!(
            im.close_ticket(TicketId::new(1), "x").unwrap_err(),
            TicketError::UnknownTicket(TicketId::new(1))
        );
    }

    #[test]
    fn top_maintainers_lists_every_user() {
        let mut im = manager();
        let id = im
            .open_ticket("alpha", "/System/SubA", "x", Severity::Major)
            .unwrap();
        im.assign_ticket(id, "delta").unwrap();
        im.close_ticket(id, "fixed").unwrap();

        assert_eq!(
            im.top_maintainers(),
            vec!["delta: 1", "alpha: 0", "gamma: 0"]
        );
    }

    #[test]
    fn summary_collects_all_reports() {
        let mut im = manager();
        im.open_ticket("alpha", "/System", "a", Severity::Minor)
            .unwrap();
        let id = im
            .open_ticket("alpha", "/System", "b", Severity::Blocking)
            .unwrap();
        im.assign_ticket(id, "gamma").unwrap();

        let summary = im.summary();
        assert_eq!(summary.tickets.len(), 2);
        assert_eq!(summary.tickets[0].severity(), Severity::Blocking);
        assert_eq!(summary.open_by_severity.len(), 1);
        assert_eq!(summary.all_by_severity.len(), 2);
        assert_eq!(summary.by_state.get(&State::Assigned), Some(&1));
        assert_eq!(summary.top_maintainers.len(), 3);
    }
}
