//! Lookup helpers for locating terminals before a build.
//!
//! All functions are linear scans in netlist order and never mutate their
//! inputs. The `find_*_by_type*` helpers are shorthands for a
//! [`NodeFilter`] passed to [`find_nodes`] / [`find_groups`].

use std::collections::BTreeSet;

use crate::component::Introspect;
use crate::netlist::{ComponentId, Group, Netlist, Node};

/// The group containing `node`.
pub fn find_group<'a>(netlist: &'a Netlist, node: &Node) -> Option<&'a Group> {
    netlist.group_of(node)
}

/// Criteria a node must meet. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFilter {
    /// Accepted component type ids; empty accepts any type.
    pub types: BTreeSet<String>,
    /// Exact display name.
    pub name: Option<String>,
    /// Only these components.
    pub within: Option<BTreeSet<ComponentId>>,
    /// The node must share a group with at least one of these.
    pub grouped_with: Vec<Node>,
}

impl NodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn within(mut self, components: impl IntoIterator<Item = ComponentId>) -> Self {
        self.within
            .get_or_insert_with(BTreeSet::new)
            .extend(components);
        self
    }

    pub fn grouped_with(mut self, anchors: impl IntoIterator<Item = Node>) -> Self {
        self.grouped_with.extend(anchors);
        self
    }

    pub fn matches<C: Introspect + ?Sized>(
        &self,
        netlist: &Netlist,
        components: &C,
        node: &Node,
    ) -> bool {
        let id = node.component;
        if !self.types.is_empty() {
            match components.type_id(id) {
                Some(t) if self.types.contains(t) => {}
                _ => return false,
            }
        }
        if let Some(name) = &self.name {
            if components.display_name(id) != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(within) = &self.within {
            if !within.contains(&id) {
                return false;
            }
        }
        self.grouped_with.is_empty()
            || self
                .grouped_with
                .iter()
                .any(|anchor| netlist.same_group(anchor, node))
    }
}

/// Every node matching `filter`, in netlist order.
pub fn find_nodes<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    filter: &NodeFilter,
) -> Vec<Node> {
    netlist
        .nodes()
        .filter(|n| filter.matches(netlist, components, n))
        .copied()
        .collect()
}

/// Every group holding at least one node matching `filter`. Each group is
/// returned once.
pub fn find_groups<'a, C: Introspect + ?Sized>(
    netlist: &'a Netlist,
    components: &C,
    filter: &NodeFilter,
) -> Vec<&'a Group> {
    netlist
        .groups()
        .iter()
        .filter(|g| g.iter().any(|n| filter.matches(netlist, components, n)))
        .collect()
}

/// Nodes whose component type is one of `types` and, with `name`, whose
/// display name matches exactly. An empty `types` slice accepts every
/// type, so `find_nodes_by_type(nl, c, &[], Some("R1"))` is a lookup by
/// name alone.
pub fn find_nodes_by_type<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    types: &[&str],
    name: Option<&str>,
) -> Vec<Node> {
    find_nodes(netlist, components, &type_filter(types, name))
}

/// Groups holding a node [`find_nodes_by_type`] would return, each once.
pub fn find_groups_by_type<'a, C: Introspect + ?Sized>(
    netlist: &'a Netlist,
    components: &C,
    types: &[&str],
    name: Option<&str>,
) -> Vec<&'a Group> {
    find_groups(netlist, components, &type_filter(types, name))
}

/// Like [`find_nodes_by_type`], restricted to `subset`.
pub fn find_nodes_by_type_in<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    types: &[&str],
    name: Option<&str>,
    subset: &[ComponentId],
) -> Vec<Node> {
    let filter = type_filter(types, name).within(subset.iter().copied());
    find_nodes(netlist, components, &filter)
}

/// Like [`find_nodes_by_type`], keeping only nodes wired to one of `anchors`.
pub fn find_nodes_by_type_grouped_with<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    types: &[&str],
    name: Option<&str>,
    anchors: &[Node],
) -> Vec<Node> {
    let filter = type_filter(types, name).grouped_with(anchors.iter().copied());
    find_nodes(netlist, components, &filter)
}

fn type_filter(types: &[&str], name: Option<&str>) -> NodeFilter {
    let filter = NodeFilter::new().types(types.iter().copied());
    match name {
        Some(n) => filter.named(n),
        None => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentSet};

    /// IN -R1- a -R2- OUT, with C1 from a to ground.
    fn fixture() -> (ComponentSet, Netlist) {
        let mut set = ComponentSet::new();
        let input = set.add(Component::new("IN", "port", 1));
        let r1 = set.add(Component::two_terminal("R1", "resistor"));
        let r2 = set.add(Component::two_terminal("R2", "resistor"));
        let c1 = set.add(Component::two_terminal("C1", "capacitor"));
        let out = set.add(Component::new("OUT", "port", 1));
        let gnd = set.add(Component::new("GND", "port", 1));
        let nl = Netlist::new(
            vec![
                Group::new([Node::new(input, 0), Node::new(r1, 0)]),
                Group::new([Node::new(r1, 1), Node::new(r2, 0), Node::new(c1, 0)]),
                Group::new([Node::new(r2, 1), Node::new(out, 0)]),
                Group::new([Node::new(c1, 1), Node::new(gnd, 0)]),
            ],
            vec![],
        )
        .unwrap();
        (set, nl)
    }

    #[test]
    fn nodes_by_type_in_netlist_order() {
        let (set, nl) = fixture();
        let r1 = set.by_name("R1").unwrap();
        let r2 = set.by_name("R2").unwrap();
        assert_eq!(
            find_nodes_by_type(&nl, &set, &["resistor"], None),
            vec![
                Node::new(r1, 0),
                Node::new(r1, 1),
                Node::new(r2, 0),
                Node::new(r2, 1)
            ]
        );
    }

    #[test]
    fn name_filter_is_exact() {
        let (set, nl) = fixture();
        assert_eq!(find_nodes_by_type(&nl, &set, &["resistor"], Some("R2")).len(), 2);
        assert!(find_nodes_by_type(&nl, &set, &["resistor"], Some("R")).is_empty());
        assert!(find_nodes_by_type(&nl, &set, &["capacitor"], Some("R2")).is_empty());
    }

    #[test]
    fn empty_type_list_accepts_any_type() {
        let (set, nl) = fixture();
        assert_eq!(
            find_nodes_by_type(&nl, &set, &[], None).len(),
            nl.nodes().count()
        );
        let c1 = set.by_name("C1").unwrap();
        assert_eq!(
            find_nodes_by_type(&nl, &set, &[], Some("C1")),
            vec![Node::new(c1, 0), Node::new(c1, 1)]
        );
    }

    #[test]
    fn groups_returned_once() {
        let (set, nl) = fixture();
        let groups = find_groups_by_type(&nl, &set, &["resistor", "capacitor"], None);
        // Group 1 holds three matching nodes but appears once.
        assert_eq!(groups.len(), 4);
        let ports = find_groups_by_type(&nl, &set, &["port"], Some("GND"));
        assert_eq!(ports.len(), 1);
        assert!(ports[0].contains(&Node::new(set.by_name("C1").unwrap(), 1)));
    }

    #[test]
    fn restricted_to_subset() {
        let (set, nl) = fixture();
        let c1 = set.by_name("C1").unwrap();
        let found = find_nodes_by_type_in(&nl, &set, &["resistor", "capacitor"], None, &[c1]);
        assert_eq!(found, vec![Node::new(c1, 0), Node::new(c1, 1)]);
    }

    #[test]
    fn grouped_with_anchor() {
        let (set, nl) = fixture();
        let input = Node::new(set.by_name("IN").unwrap(), 0);
        let found = find_nodes_by_type_grouped_with(&nl, &set, &["resistor"], None, &[input]);
        assert_eq!(found, vec![Node::new(set.by_name("R1").unwrap(), 0)]);
    }

    #[test]
    fn find_group_for_unknown_node() {
        let (_, nl) = fixture();
        assert!(find_group(&nl, &Node::new(ComponentId(42), 0)).is_none());
    }
}
