//! Graph primitives: terminals, wire-equivalent groups and netlist snapshots.
//!
//! A [`Netlist`] is the output of an upstream wiring resolver. Each
//! [`Group`] holds terminals at the same electrical potential (joined by
//! copper only). The reducer never mutates a snapshot; a new one is built
//! whenever the switch configuration changes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReduceError;

/// Opaque identifier of a component instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single terminal: component plus terminal index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Node {
    pub component: ComponentId,
    pub terminal: usize,
}

impl Node {
    pub const fn new(component: ComponentId, terminal: usize) -> Self {
        Self {
            component,
            terminal,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.terminal)
    }
}

/// Identifier of one switch position, e.g. `SW1.bright`.
pub type SwitchPosition = String;

/// Terminals at the same electrical potential.
///
/// Stored as an ordered, de-duplicated list so that every traversal over a
/// group visits nodes in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    nodes: Vec<Node>,
}

impl Group {
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut out: Vec<Node> = Vec::new();
        for node in nodes {
            if !out.contains(&node) {
                out.push(node);
            }
        }
        Self { nodes: out }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

/// One immutable connectivity snapshot: groups plus the switch setup that
/// produced them.
#[derive(Debug, Clone)]
pub struct Netlist {
    groups: Vec<Group>,
    switch_setup: Vec<SwitchPosition>,
    index: HashMap<Node, usize>,
}

impl Netlist {
    /// Build a snapshot. Fails if a node is claimed by two groups, since
    /// groups must partition the terminals.
    pub fn new(
        groups: Vec<Group>,
        switch_setup: Vec<SwitchPosition>,
    ) -> Result<Self, ReduceError> {
        let mut index = HashMap::new();
        for (gi, group) in groups.iter().enumerate() {
            for node in group.iter() {
                if index.insert(*node, gi).is_some() {
                    return Err(ReduceError::DuplicateNode(*node));
                }
            }
        }
        Ok(Self {
            groups,
            switch_setup,
            index,
        })
    }

    /// Same groups, different switch setup.
    pub fn with_switch_setup(&self, switch_setup: Vec<SwitchPosition>) -> Self {
        Self {
            groups: self.groups.clone(),
            switch_setup,
            index: self.index.clone(),
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn switch_setup(&self) -> &[SwitchPosition] {
        &self.switch_setup
    }

    /// The group containing `node`, if any.
    pub fn group_of(&self, node: &Node) -> Option<&Group> {
        self.index.get(node).and_then(|&gi| self.groups.get(gi))
    }

    /// Index of the group containing `node`.
    pub fn group_index(&self, node: &Node) -> Option<usize> {
        self.index.get(node).copied()
    }

    /// Whether two nodes are wire-connected.
    pub fn same_group(&self, a: &Node, b: &Node) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// Every node in the snapshot, in group order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.groups.iter().flat_map(|g| g.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(c: usize, t: usize) -> Node {
        Node::new(ComponentId(c), t)
    }

    #[test]
    fn group_dedups_and_keeps_order() {
        let g = Group::new([n(2, 0), n(1, 1), n(2, 0)]);
        assert_eq!(g.nodes(), &[n(2, 0), n(1, 1)]);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn netlist_rejects_overlapping_groups() {
        let err = Netlist::new(
            vec![Group::new([n(0, 0), n(1, 0)]), Group::new([n(1, 0)])],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ReduceError::DuplicateNode(n(1, 0)));
    }

    #[test]
    fn group_lookup() {
        let nl = Netlist::new(
            vec![Group::new([n(0, 0), n(1, 0)]), Group::new([n(1, 1)])],
            vec!["SW1.a".into()],
        )
        .unwrap();
        assert_eq!(nl.group_index(&n(1, 1)), Some(1));
        assert!(nl.same_group(&n(0, 0), &n(1, 0)));
        assert!(!nl.same_group(&n(0, 0), &n(1, 1)));
        assert!(nl.group_of(&n(5, 0)).is_none());
        assert_eq!(nl.switch_setup(), &["SW1.a".to_string()]);
    }

    #[test]
    fn node_display() {
        assert_eq!(n(3, 1).to_string(), "#3.1");
    }
}
