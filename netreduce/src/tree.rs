//! Series/parallel path expressions.
//!
//! A [`Tree`] describes how the reducer got from one terminal to another:
//! a [`Leaf`] is a hop through one component, [`Tree::Series`] chains hops
//! and [`Tree::Parallel`] lists electrically alternative routes.
//!
//! ```text
//! Series[#0(0>1), Parallel[#1(0>1), #2(0>1)], #3(1>0)]
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::Introspect;
use crate::netlist::ComponentId;

/// Traversal through one component, entering at `entry` and leaving at `exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leaf {
    pub component: ComponentId,
    pub entry: usize,
    pub exit: usize,
}

impl Leaf {
    pub const fn new(component: ComponentId, entry: usize, exit: usize) -> Self {
        Self {
            component,
            entry,
            exit,
        }
    }

    /// Same component and same terminal pair, ignoring direction.
    pub fn same_element(&self, other: &Leaf) -> bool {
        self.component == other.component
            && ((self.entry == other.entry && self.exit == other.exit)
                || (self.entry == other.exit && self.exit == other.entry))
    }

    pub const fn reversed(&self) -> Self {
        Self::new(self.component, self.exit, self.entry)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}>{})", self.component, self.entry, self.exit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tree {
    Leaf(Leaf),
    /// Steps traversed one after another.
    Series(Vec<Tree>),
    /// Alternative routes between the same two endpoints.
    Parallel(Vec<Tree>),
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Tree::Leaf(a), Tree::Leaf(b)) => a == b,
            (Tree::Series(a), Tree::Series(b)) => a == b,
            (Tree::Parallel(a), Tree::Parallel(b)) => same_multiset(a, b),
            _ => false,
        }
    }
}

impl Eq for Tree {}

/// Order-insensitive comparison of parallel children.
fn same_multiset(a: &[Tree], b: &[Tree]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        let hit = b
            .iter()
            .zip(used.iter())
            .position(|(y, taken)| !*taken && x == y);
        match hit.and_then(|j| used.get_mut(j)) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    })
}

impl From<Leaf> for Tree {
    fn from(leaf: Leaf) -> Self {
        Tree::Leaf(leaf)
    }
}

impl Tree {
    pub fn leaf(component: ComponentId, entry: usize, exit: usize) -> Self {
        Tree::Leaf(Leaf::new(component, entry, exit))
    }

    /// The bare wire: start and end are the same potential.
    pub fn wire() -> Self {
        Tree::Series(Vec::new())
    }

    pub fn is_wire(&self) -> bool {
        matches!(self, Tree::Series(c) if c.is_empty())
    }

    /// A series of `steps`, unwrapped when there is exactly one step.
    pub fn series(mut steps: Vec<Tree>) -> Self {
        if steps.len() == 1 {
            if let Some(only) = steps.pop() {
                return only;
            }
        }
        Tree::Series(steps)
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Tree::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Leaf(_) => &[],
            Tree::Series(c) | Tree::Parallel(c) => c,
        }
    }

    /// The sequence of steps this tree stands for: a series' children, or
    /// the tree itself as a single step.
    pub fn elements(&self) -> &[Tree] {
        match self {
            Tree::Series(c) => c,
            other => std::slice::from_ref(other),
        }
    }

    pub fn into_elements(self) -> Vec<Tree> {
        match self {
            Tree::Series(c) => c,
            other => vec![other],
        }
    }

    /// Whether `needle` occurs anywhere in this tree (structural equality).
    pub fn contains(&self, needle: &Tree) -> bool {
        self == needle || self.children().iter().any(|c| c.contains(needle))
    }

    /// All leaves, depth-first, left to right.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Leaf>) {
        match self {
            Tree::Leaf(l) => out.push(*l),
            Tree::Series(c) | Tree::Parallel(c) => {
                for child in c {
                    child.collect_leaves(out);
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Series(c) | Tree::Parallel(c) => {
                1 + c.iter().map(Tree::depth).max().unwrap_or(0)
            }
        }
    }

    /// Components that occur in more than one leaf position.
    ///
    /// A series/parallel network built by the reducer mentions each component
    /// once; repeats usually mean a bridge the tree cannot express exactly.
    pub fn repeated_components(&self) -> Vec<ComponentId> {
        let mut counts: BTreeMap<ComponentId, usize> = BTreeMap::new();
        for leaf in self.leaves() {
            *counts.entry(leaf.component).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id)
            .collect()
    }

    /// Compact form: single-child containers are unwrapped, nested
    /// containers of the same kind are spliced, and wires inside a series
    /// are dropped. Electrical meaning is unchanged.
    pub fn normalized(&self) -> Tree {
        match self {
            Tree::Leaf(l) => Tree::Leaf(*l),
            Tree::Series(children) => {
                let mut steps = Vec::new();
                for child in children.iter().map(Tree::normalized) {
                    match child {
                        Tree::Series(inner) => steps.extend(inner),
                        other => steps.push(other),
                    }
                }
                Tree::series(steps)
            }
            Tree::Parallel(children) => {
                let mut alts = Vec::new();
                for child in children.iter().map(Tree::normalized) {
                    match child {
                        Tree::Parallel(inner) => alts.extend(inner),
                        other => alts.push(other),
                    }
                }
                if alts.len() == 1 {
                    Tree::series(alts)
                } else {
                    Tree::Parallel(alts)
                }
            }
        }
    }

    /// Display adaptor that prints component names instead of ids.
    pub fn named<'a, C: Introspect>(&'a self, components: &'a C) -> Named<'a, C> {
        Named {
            tree: self,
            components,
        }
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    head: &str,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    write!(f, "{head}[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(l) => write!(f, "{l}"),
            Tree::Series(c) => write_list(f, "Series", c.iter()),
            Tree::Parallel(c) => write_list(f, "Parallel", c.iter()),
        }
    }
}

/// See [`Tree::named`].
pub struct Named<'a, C: Introspect> {
    tree: &'a Tree,
    components: &'a C,
}

impl<'a, C: Introspect> fmt::Display for Named<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let child = |t: &'a Tree| Named {
            tree: t,
            components: self.components,
        };
        match self.tree {
            Tree::Leaf(l) => match self.components.display_name(l.component) {
                Some(name) => write!(f, "{}({}>{})", name, l.entry, l.exit),
                None => write!(f, "{l}"),
            },
            Tree::Series(c) => write_list(f, "Series", c.iter().map(child)),
            Tree::Parallel(c) => write_list(f, "Parallel", c.iter().map(child)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentSet};

    fn leaf(c: usize) -> Tree {
        Tree::leaf(ComponentId(c), 0, 1)
    }

    #[test]
    fn parallel_equality_ignores_order() {
        let a = Tree::Parallel(vec![leaf(1), leaf(2), leaf(2)]);
        let b = Tree::Parallel(vec![leaf(2), leaf(1), leaf(2)]);
        let c = Tree::Parallel(vec![leaf(2), leaf(1), leaf(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn series_equality_respects_order() {
        let a = Tree::Series(vec![leaf(1), leaf(2)]);
        let b = Tree::Series(vec![leaf(2), leaf(1)]);
        assert_ne!(a, b);
        assert_ne!(Tree::Series(vec![leaf(1)]), Tree::Parallel(vec![leaf(1)]));
    }

    #[test]
    fn leaf_direction_matters_for_equality_not_identity() {
        let fwd = Leaf::new(ComponentId(0), 0, 1);
        assert_ne!(fwd, fwd.reversed());
        assert!(fwd.same_element(&fwd.reversed()));
        assert!(!fwd.same_element(&Leaf::new(ComponentId(0), 0, 2)));
    }

    #[test]
    fn display_nested() {
        let t = Tree::Series(vec![
            leaf(0),
            Tree::Parallel(vec![leaf(1), leaf(2)]),
            Tree::leaf(ComponentId(3), 1, 0),
        ]);
        assert_eq!(
            t.to_string(),
            "Series[#0(0>1), Parallel[#1(0>1), #2(0>1)], #3(1>0)]"
        );
    }

    #[test]
    fn display_with_names() {
        let mut set = ComponentSet::new();
        let r1 = set.add(Component::two_terminal("R1", "resistor"));
        let t = Tree::Series(vec![Tree::leaf(r1, 0, 1), Tree::leaf(ComponentId(9), 1, 0)]);
        assert_eq!(t.named(&set).to_string(), "Series[R1(0>1), #9(1>0)]");
    }

    #[test]
    fn normalize_flattens() {
        let t = Tree::Parallel(vec![Tree::Series(vec![
            Tree::Series(vec![leaf(0)]),
            Tree::Parallel(vec![Tree::Series(vec![leaf(1)]), Tree::Parallel(vec![leaf(2), leaf(3)])]),
        ])]);
        assert_eq!(
            t.normalized(),
            Tree::Series(vec![leaf(0), Tree::Parallel(vec![leaf(1), leaf(2), leaf(3)])])
        );
    }

    #[test]
    fn normalize_keeps_wire() {
        let t = Tree::Parallel(vec![Tree::wire()]);
        assert!(t.normalized().is_wire());
    }

    #[test]
    fn contains_and_leaves() {
        let inner = Tree::Parallel(vec![leaf(1), leaf(2)]);
        let t = Tree::Series(vec![leaf(0), inner.clone()]);
        assert!(t.contains(&inner));
        assert!(t.contains(&leaf(2)));
        assert!(!t.contains(&leaf(5)));
        assert_eq!(t.leaves().len(), 3);
        assert_eq!(t.depth(), 3);
    }

    #[test]
    fn clone_is_deep() {
        let original = Tree::Series(vec![leaf(0), leaf(1)]);
        let mut copy = original.clone();
        if let Tree::Series(steps) = &mut copy {
            steps.push(leaf(2));
        }
        assert_eq!(original.children().len(), 2);
        assert_eq!(copy.children().len(), 3);
    }

    #[test]
    fn repeated_components_reported_once() {
        let t = Tree::Parallel(vec![
            Tree::Series(vec![leaf(0), leaf(4)]),
            Tree::Series(vec![leaf(1), Tree::leaf(ComponentId(4), 1, 0)]),
        ]);
        assert_eq!(t.repeated_components(), vec![ComponentId(4)]);
    }

    #[test]
    fn serializes_to_json() {
        let t = Tree::Series(vec![leaf(0)]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"Series":[{"Leaf":{"component":0,"entry":0,"exit":1}}]}"#);
    }
}
