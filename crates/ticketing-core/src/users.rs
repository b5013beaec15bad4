//! User registry: unique usernames mapped to roles and closed-ticket counts.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::{Result, TicketError};
use crate::model::user::{Role, User};

#[derive(Debug, Default, Clone)]
pub struct UserRegistry {
    users: HashMap<String, User>,
}

impl UserRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user with a zero closed-ticket count.
    ///
    /// # Errors
    ///
    /// [`TicketError::DuplicateUser`] if the name is taken,
    /// [`TicketError::InvalidRoles`] if `roles` is empty.
    pub fn register<I>(&mut self, username: &str, roles: I) -> Result<()>
    where
        I: IntoIterator<Item = Role>,
    {
        if self.users.contains_key(username) {
            return Err(TicketError::DuplicateUser(username.to_string()));
        }
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(TicketError::InvalidRoles(username.to_string()));
        }

        debug!(user = username, ?roles, "registering user");
        self.users
            .insert(username.to_string(), User::new(username, roles));
        Ok(())
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownUser`] if the name is not registered.
    pub fn get(&self, username: &str) -> Result<&User> {
        self.users
            .get(username)
            .ok_or_else(|| TicketError::UnknownUser(username.to_string()))
    }

    pub(crate) fn get_mut(&mut self, username: &str) -> Result<&mut User> {
        self.users
            .get_mut(username)
            .ok_or_else(|| TicketError::UnknownUser(username.to_string()))
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownUser`] if the name is not registered.
    pub fn roles_of(&self, username: &str) -> Result<&BTreeSet<Role>> {
        self.get(username).map(User::roles)
    }

    /// Look up a user and check it holds `role`.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownUser`], or the role-specific precondition
    /// error ([`TicketError::NotMaintainer`] / [`TicketError::NotReporter`]).
    pub fn require_role(&self, username: &str, role: Role) -> Result<&User> {
        let user = self.get(username)?;
        if user.has_role(role) {
            return Ok(user);
        }
        debug!(user = username, %role, "role check failed");
        Err(match role {
            Role::Maintainer => TicketError::NotMaintainer(username.to_string()),
            Role::Reporter => TicketError::NotReporter(username.to_string()),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
