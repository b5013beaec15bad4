//! Component tree addressed by slash-delimited paths.
//!
//! Nodes live in a `petgraph` arena with `parent -> child` edges; a path
//! index maps `/System/SubB/SubB.2`-style keys to node indices. Children
//! never own their parent, they only hold an edge back to it.
//!
//! Roots are registered as `/name`, subcomponents as `parent_path/name`.
//! Both share one path namespace, and uniqueness is always checked against
//! the full path, so the same leaf name may appear under different parents.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TicketError};

/// Path separator between component names.
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    name: String,
    path: String,
}

impl Component {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Default, Clone)]
pub struct ComponentTree {
    graph: DiGraph<Component, ()>,
    by_path: HashMap<String, NodeIndex>,
}

/// Path under which a root component named `name` is registered.
#[must_use]
pub fn root_path(name: &str) -> String {
    format!("{PATH_SEPARATOR}{name}")
}

/// Path under which a child named `name` of `parent_path` is registered.
#[must_use]
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{parent_path}{PATH_SEPARATOR}{name}")
}

impl ComponentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a top-level component at `/name`.
    ///
    /// # Errors
    ///
    /// [`TicketError::DuplicateComponent`] if `/name` is already registered.
    pub fn define_root(&mut self, name: &str) -> Result<&Component> {
        let path = root_path(name);
        if self.by_path.contains_key(&path) {
            return Err(TicketError::DuplicateComponent(path));
        }
        let idx = self.insert(name, path);
        Ok(&self.graph[idx])
    }

    /// Define `name` as a child of the component at `parent_path`.
    ///
    /// # Errors
    ///
    /// [`TicketError::DuplicateComponent`] if `parent_path/name` exists,
    /// [`TicketError::UnknownComponent`] if `parent_path` does not resolve.
    pub fn define_child(&mut self, name: &str, parent_path: &str) -> Result<&Component> {
        let path = child_path(parent_path, name);
        if self.by_path.contains_key(&path) {
            return Err(TicketError::DuplicateComponent(path));
        }
        let parent = self.resolve(parent_path)?;
        let idx = self.insert(name, path);
        self.graph.add_edge(parent, idx, ());
        Ok(&self.graph[idx])
    }

    /// # Errors
    ///
    /// [`TicketError::UnknownComponent`] if `path` does not resolve.
    pub fn get(&self, path: &str) -> Result<&Component> {
        self.resolve(path).map(|idx| &self.graph[idx])
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Names of the immediate children of the component at `path`.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownComponent`] if `path` does not resolve.
    pub fn children_of(&self, path: &str) -> Result<BTreeSet<String>> {
        let idx = self.resolve(path)?;
        Ok(self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child| self.graph[child].name.clone())
            .collect())
    }

    /// Name of the immediate parent of the component at `path`.
    ///
    /// # Errors
    ///
    /// [`TicketError::UnknownComponent`] if `path` does not resolve,
    /// [`TicketError::NoParent`] if it is a root.
    pub fn parent_of(&self, path: &str) -> Result<&str> {
        let idx = self.resolve(path)?;
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|parent| self.graph[parent].name.as_str())
            .ok_or_else(|| TicketError::NoParent(path.to_string()))
    }

    /// Every registered path, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.by_path.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn resolve(&self, path: &str) -> Result<NodeIndex> {
        self.by_path
            .get(path)
            .copied()
            .ok_or_else(|| TicketError::UnknownComponent(path.to_string()))
    }

    fn insert(&mut self, name: &str, path: String) -> NodeIndex {
        debug!(component = %path, "defining component");
        let idx = self.graph.add_node(Component {
            name: name.to_string(),
            path: path.clone(),
        });
        self.by_path.insert(path, idx);
        idx
    }
}
