//! Component introspection.
//!
//! The reducer does not own components. It only needs to ask, for a
//! component and two of its terminals, whether current can flow between
//! them under the current switch setup. [`Introspect`] is that seam;
//! [`ComponentSet`] is a plain-data implementation used by the `.net`
//! loader and the CLI.

use serde::{Deserialize, Serialize};

use crate::netlist::{ComponentId, SwitchPosition};

/// Name of an internal link, e.g. `"body"` or `"0-2"`.
pub type LinkName = String;

/// A declared electrical path between two terminals of one component.
///
/// Links are symmetric. A link with `when` set is only active while that
/// switch position is part of the netlist's setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLink {
    pub a: usize,
    pub b: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LinkName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<SwitchPosition>,
}

impl InternalLink {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            name: None,
            when: None,
        }
    }

    pub fn named(mut self, name: impl Into<LinkName>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn when(mut self, position: impl Into<SwitchPosition>) -> Self {
        self.when = Some(position.into());
        self
    }

    /// Whether this link joins terminals `x` and `y`, in either direction.
    pub fn joins(&self, x: usize, y: usize) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub fn is_active(&self, setup: &[SwitchPosition]) -> bool {
        match &self.when {
            Some(position) => setup.iter().any(|p| p == position),
            None => true,
        }
    }

    pub fn label(&self) -> LinkName {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.a, self.b))
    }
}

/// Read-only view of the components referenced by a netlist.
pub trait Introspect {
    /// Number of terminals, or `None` for an unknown component.
    fn terminal_count(&self, id: ComponentId) -> Option<usize>;

    /// Every link the component declares, active or not.
    fn links(&self, id: ComponentId) -> &[InternalLink];

    /// Type identifier used by the query layer (e.g. `"resistor"`).
    fn type_id(&self, id: ComponentId) -> Option<&str>;

    /// Display name (e.g. `"R1"`).
    fn display_name(&self, id: ComponentId) -> Option<&str>;

    /// The active link between terminals `a` and `b`, if any.
    fn internal_link(
        &self,
        id: ComponentId,
        a: usize,
        b: usize,
        setup: &[SwitchPosition],
    ) -> Option<LinkName> {
        if a == b {
            return None;
        }
        self.links(id)
            .iter()
            .find(|l| l.joins(a, b) && l.is_active(setup))
            .map(InternalLink::label)
    }
}

/// A component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub kind: String,
    pub terminals: usize,
    #[serde(default)]
    pub links: Vec<InternalLink>,
}

impl Component {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, terminals: usize) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            terminals,
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: InternalLink) -> Self {
        self.links.push(link);
        self
    }

    /// Two-terminal part whose leads are always linked (resistor, fuse, ...).
    pub fn two_terminal(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(name, kind, 2).with_link(InternalLink::new(0, 1).named("body"))
    }
}

/// Components indexed by [`ComponentId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component and return its id.
    pub fn add(&mut self, component: Component) -> ComponentId {
        self.components.push(component);
        ComponentId(self.components.len() - 1)
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name == name)
            .map(ComponentId)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentId(i), c))
    }
}

impl Introspect for ComponentSet {
    fn terminal_count(&self, id: ComponentId) -> Option<usize> {
        self.get(id).map(|c| c.terminals)
    }

    fn links(&self, id: ComponentId) -> &[InternalLink] {
        self.get(id).map(|c| c.links.as_slice()).unwrap_or(&[])
    }

    fn type_id(&self, id: ComponentId) -> Option<&str> {
        self.get(id).map(|c| c.kind.as_str())
    }

    fn display_name(&self, id: ComponentId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }
}
