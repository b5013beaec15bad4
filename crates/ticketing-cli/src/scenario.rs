//! Scenario files: a declarative script of tracker operations.
//!
//! ```toml
//! [[users]]
//! name = "alpha"
//! roles = ["reporter"]
//!
//! [[components]]
//! name = "System"
//!
//! [[components]]
//! name = "SubA"
//! parent = "/System"
//!
//! [[steps]]
//! op = "open"
//! user = "alpha"
//! component = "/System/SubA"
//! description = "menu is missing"
//! severity = "major"
//! ```
//!
//! Users are registered first, then components are defined in file order,
//! then steps run in order. Each entry yields one [`Outcome`].

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ticketing_core::components;
use ticketing_core::{IssueManager, Role, Severity, TicketError, TicketId};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSpec {
    pub name: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub name: String,
    /// Path of the parent; absent for top-level components.
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase", deny_unknown_fields)]
pub enum Step {
    Open {
        user: String,
        component: String,
        description: String,
        severity: Severity,
    },
    Assign {
        ticket: TicketId,
        user: String,
    },
    Close {
        ticket: TicketId,
        resolution: String,
    },
    Show {
        ticket: TicketId,
    },
    Roles {
        user: String,
    },
    Children {
        path: String,
    },
    Parent {
        path: String,
    },
}

impl Step {
    const fn op(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Assign { .. } => "assign",
            Self::Close { .. } => "close",
            Self::Show { .. } => "show",
            Self::Roles { .. } => "roles",
            Self::Children { .. } => "children",
            Self::Parent { .. } => "parent",
        }
    }
}

/// Failure recorded for a single scenario entry.
#[derive(Debug, Clone, Serialize)]
pub struct StepError {
    pub error_code: String,
    pub kind: String,
    /// Short per-code summary, e.g. "Ticket is not assigned".
    pub summary: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&TicketError> for StepError {
    fn from(err: &TicketError) -> Self {
        Self {
            error_code: err.code().to_string(),
            kind: err.kind().to_string(),
            summary: err.code().message(),
            message: err.to_string(),
            hint: err.hint().map(str::to_string),
        }
    }
}

/// Result of one scenario entry.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub op: &'static str,
    pub target: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl Outcome {
    fn from_result(
        op: &'static str,
        target: String,
        result: Result<Option<Value>, TicketError>,
    ) -> Self {
        match result {
            Ok(detail) => Self {
                op,
                target,
                ok: true,
                detail,
                error: None,
            },
            Err(err) => {
                warn!(op, %target, code = %err.code(), "scenario entry failed: {err}");
                Self {
                    op,
                    target,
                    ok: false,
                    detail: None,
                    error: Some(StepError::from(&err)),
                }
            }
        }
    }
}

/// Parse a scenario from TOML text.
///
/// # Errors
///
/// Returns an error on malformed TOML or unknown fields/operations.
pub fn parse(text: &str) -> anyhow::Result<Scenario> {
    toml::from_str(text).context("invalid scenario")
}

/// Read and parse a scenario file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> anyhow::Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

impl Scenario {
    /// Run every entry against `manager`.
    ///
    /// With `keep_going` unset, stops after the first failed entry; the
    /// failure is the last outcome returned.
    pub fn apply(&self, manager: &mut IssueManager, keep_going: bool) -> Vec<Outcome> {
        let mut outcomes = Vec::new();

        for user in &self.users {
            let result = manager
                .register_user(&user.name, user.roles.iter().copied())
                .map(|()| Some(json!({ "roles": user.roles })));
            let outcome = Outcome::from_result("register", user.name.clone(), result);
            if record(&mut outcomes, outcome, keep_going) {
                return outcomes;
            }
        }

        for component in &self.components {
            let (target, result) = match component.parent.as_deref() {
                None => (
                    components::root_path(&component.name),
                    manager.define_root_component(&component.name),
                ),
                Some(parent) => (
                    components::child_path(parent, &component.name),
                    manager.define_child_component(&component.name, parent),
                ),
            };
            let result = result.map(|defined| Some(json!({ "name": defined.name() })));
            let outcome = Outcome::from_result("define", target, result);
            if record(&mut outcomes, outcome, keep_going) {
                return outcomes;
            }
        }

        for step in &self.steps {
            debug!(op = step.op(), "running scenario step");
            let (target, result) = run_step(manager, step);
            let outcome = Outcome::from_result(step.op(), target, result);
            if record(&mut outcomes, outcome, keep_going) {
                return outcomes;
            }
        }

        outcomes
    }
}

/// Push `outcome`; true when the run should stop here.
fn record(outcomes: &mut Vec<Outcome>, outcome: Outcome, keep_going: bool) -> bool {
    let failed = !outcome.ok;
    outcomes.push(outcome);
    failed && !keep_going
}

fn run_step(
    manager: &mut IssueManager,
    step: &Step,
) -> (String, Result<Option<Value>, TicketError>) {
    match step {
        Step::Open {
            user,
            component,
            description,
            severity,
        } => (
            component.clone(),
            manager
                .open_ticket(user, component, description, *severity)
                .map(|id| Some(json!({ "ticket": id }))),
        ),
        Step::Assign { ticket, user } => (
            ticket.to_string(),
            manager
                .assign_ticket(*ticket, user)
                .map(|()| Some(json!({ "maintainer": user }))),
        ),
        Step::Close { ticket, resolution } => (
            ticket.to_string(),
            manager.close_ticket(*ticket, resolution).map(|()| None),
        ),
        Step::Show { ticket } => (
            ticket.to_string(),
            manager.ticket(*ticket).map(|found| Some(json!(found))),
        ),
        Step::Roles { user } => (
            user.clone(),
            manager
                .roles_of(user)
                .map(|roles| Some(json!({ "roles": roles }))),
        ),
        Step::Children { path } => (
            path.clone(),
            manager
                .children_of(path)
                .map(|children| Some(json!({ "children": children }))),
        ),
        Step::Parent { path } => (
            path.clone(),
            manager
                .parent_of(path)
                .map(|parent| Some(json!({ "parent": parent }))),
        ),
    }
}

/// The reference walkthrough used by `tkt demo`.
#[must_use]
pub fn demo() -> Scenario {
    let user = |name: &str, roles: &[Role]| UserSpec {
        name: name.to_string(),
        roles: roles.to_vec(),
    };
    let component = |name: &str, parent: Option<&str>| ComponentSpec {
        name: name.to_string(),
        parent: parent.map(str::to_string),
    };
    let open = |user: &str, component: &str, description: &str, severity| Step::Open {
        user: user.to_string(),
        component: component.to_string(),
        description: description.to_string(),
        severity,
    };
    let both = [Role::Reporter, Role::Maintainer];

    Scenario {
        users: vec![
            user("alpha", &[Role::Reporter]),
            user("beta", &[Role::Reporter]),
            user("gamma", &both),
            user("delta", &both),
            user("epsilon", &[Role::Maintainer]),
        ],
        components: vec![
            component("System", None),
            component("SubA", Some("/System")),
            component("SubB", Some("/System")),
            component("SubC", Some("/System")),
            component("SubB.1", Some("/System/SubB")),
            component("SubB.2", Some("/System/SubB")),
        ],
        steps: vec![
            Step::Roles {
                user: "gamma".into(),
            },
            Step::Children {
                path: "/System".into(),
            },
            Step::Parent {
                path: "/System/SubB/SubB.2".into(),
            },
            open(
                "alpha",
                "/System/SubA",
                "Initial menu does not show 'open' item",
                Severity::Major,
            ),
            open("beta", "/System/SubA", "Cannot save form XYZ", Severity::Major),
            open(
                "alpha",
                "/System/SubB",
                "The colors in the diagram are hard to tell apart",
                Severity::Minor,
            ),
            open(
                "alpha",
                "/System",
                "The system is not responding today",
                Severity::Blocking,
            ),
            Step::Show {
                ticket: TicketId::new(4),
            },
            Step::Assign {
                ticket: TicketId::new(4),
                user: "delta".into(),
            },
            Step::Close {
                ticket: TicketId::new(4),
                resolution: "The user had the network cable unplugged...".into(),
            },
            Step::Show {
                ticket: TicketId::new(4),
            },
        ],
    }
}
