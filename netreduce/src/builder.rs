//! Path search between two terminals.
//!
//! [`TreeBuilder`] runs a depth-first search from `start` to `end` over one
//! netlist snapshot:
//!
//! 1. **wire hops** are free: reaching any node of `end`'s group completes a
//!    path without adding a step;
//! 2. **component hops** follow active internal links and add a [`Leaf`];
//! 3. **visited nodes** are tracked per branch in a persistent set, so
//!    siblings never observe each other's marks, only their ancestors';
//! 4. **sibling branches** that reach `end` are factored by the
//!    [`Merger`] and become one `Parallel` step.
//!
//! The result is always rooted in a `Parallel` (possibly with one child).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::Introspect;
use crate::error::ReduceError;
use crate::merge::Merger;
use crate::netlist::{ComponentId, Netlist, Node, SwitchPosition};
use crate::tree::{Leaf, Tree};
use crate::validate::ensure_well_formed;

/// Persistent, structurally shared visited set.
type Visited = im::HashSet<Node>;

/// Search limits. Exceeding one stops the affected branch and is reported
/// as a [`Diagnostic`]; whatever was found so far is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Maximum number of component hops on one path.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of branches explored in one build.
    #[serde(default = "default_max_branches")]
    pub max_branches: usize,
}

fn default_max_depth() -> usize { 256 }
fn default_max_branches() -> usize { 100_000 }

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_branches: default_max_branches(),
        }
    }
}

/// Cooperative cancellation flag, checked once per recursive step.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A non-fatal note attached to a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A path reached `max_depth` hops at `at` and was cut.
    DepthLimit { limit: usize, at: Node },
    /// The build explored `max_branches` branches and stopped.
    BranchLimit { limit: usize },
    /// The cancel token fired.
    Cancelled,
    /// The component occurs in several places of the tree; the network is
    /// probably not series/parallel and the tree may be imprecise.
    PossibleBridge { component: ComponentId },
}

impl Diagnostic {
    /// Whether the tree may be missing paths.
    pub fn truncates(&self) -> bool {
        !matches!(self, Diagnostic::PossibleBridge { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DepthLimit { limit, at } => {
                write!(f, "path depth limit {limit} reached at {at}; result is partial")
            }
            Diagnostic::BranchLimit { limit } => {
                write!(f, "branch limit {limit} reached; result is partial")
            }
            Diagnostic::Cancelled => write!(f, "search cancelled; result is partial"),
            Diagnostic::PossibleBridge { component } => write!(
                f,
                "component {component} appears more than once; network may not be series/parallel"
            ),
        }
    }
}

/// Outcome of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reduction {
    /// Switch setup of the snapshot that was searched.
    pub switch_setup: Vec<SwitchPosition>,
    /// `None` when no path exists.
    pub tree: Option<Tree>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Reduction {
    /// Whether a limit or cancellation cut the search short.
    pub fn is_partial(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::truncates)
    }
}

/// Depth-first path search over one netlist snapshot.
pub struct TreeBuilder<'a, C: Introspect + ?Sized> {
    netlist: &'a Netlist,
    components: &'a C,
    options: BuildOptions,
    cancel: Option<CancelToken>,
    merger: Merger,
}

impl<'a, C: Introspect + ?Sized> TreeBuilder<'a, C> {
    pub fn new(netlist: &'a Netlist, components: &'a C) -> Self {
        Self {
            netlist,
            components,
            options: BuildOptions::default(),
            cancel: None,
            merger: Merger::new(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Enumerate every non-cyclic path from `start` to `end`.
    ///
    /// Internal links are validated before the search starts; a malformed
    /// link is an error. A `start` terminal outside the netlist yields a
    /// reduction without a tree.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn build(&self, start: Node, end: Node) -> Result<Reduction, ReduceError> {
        ensure_well_formed(self.netlist, self.components)?;

        let switch_setup = self.netlist.switch_setup().to_vec();
        if self.netlist.group_of(&start).is_none() {
            tracing::debug!("start terminal {start} is not in the netlist");
            return Ok(Reduction {
                switch_setup,
                tree: None,
                diagnostics: Vec::new(),
            });
        }

        let mut search = Search {
            builder: self,
            end,
            branches: 0,
            depth_hit: false,
            halted: false,
            diagnostics: Vec::new(),
        };
        let steps = search.explore(start, None, Visited::new(), 0);
        let mut diagnostics = search.diagnostics;
        let tree = steps.map(into_root);

        if let Some(tree) = &tree {
            diagnostics.extend(
                tree.repeated_components()
                    .into_iter()
                    .map(|component| Diagnostic::PossibleBridge { component }),
            );
        }
        for d in &diagnostics {
            tracing::warn!("{d}");
        }
        tracing::debug!(
            found = tree.is_some(),
            branches = search.branches,
            "search finished"
        );

        Ok(Reduction {
            switch_setup,
            tree,
            diagnostics,
        })
    }
}

/// Wrap the top-level step list in the conventional `Parallel` root.
fn into_root(mut steps: Vec<Tree>) -> Tree {
    if steps.len() == 1 && matches!(steps.first(), Some(Tree::Parallel(_))) {
        if let Some(root) = steps.pop() {
            return root;
        }
    }
    Tree::Parallel(vec![Tree::Series(steps)])
}

/// Per-build mutable state. Path data never lives here: every frame owns
/// the steps it returns and receives its own visited set.
struct Search<'s, 'a, C: Introspect + ?Sized> {
    builder: &'s TreeBuilder<'a, C>,
    end: Node,
    branches: usize,
    depth_hit: bool,
    halted: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<C: Introspect + ?Sized> Search<'_, '_, C> {
    /// Steps from `current` to the end terminal, or `None` on a dead end.
    /// `arrived` is the hop that led here.
    fn explore(
        &mut self,
        current: Node,
        arrived: Option<Leaf>,
        visited: Visited,
        depth: usize,
    ) -> Option<Vec<Tree>> {
        if current == self.end {
            return Some(Vec::new());
        }
        if self.halted {
            return None;
        }
        if let Some(token) = &self.builder.cancel {
            if token.is_cancelled() {
                self.halted = true;
                self.diagnostics.push(Diagnostic::Cancelled);
                return None;
            }
        }
        let netlist = self.builder.netlist;
        let components = self.builder.components;
        let group = netlist.group_of(&current)?;
        if group.contains(&self.end) {
            return Some(Vec::new());
        }

        let options = self.builder.options;
        // Reaching the end from here needs one more hop.
        if depth >= options.max_depth {
            if !self.depth_hit {
                self.depth_hit = true;
                self.diagnostics.push(Diagnostic::DepthLimit {
                    limit: options.max_depth,
                    at: current,
                });
            }
            return None;
        }

        let visited = group.iter().fold(visited, |v, n| v.update(*n));
        let setup = netlist.switch_setup();
        let mut branches: Vec<Tree> = Vec::new();

        'scan: for node in group.iter() {
            let Some(count) = components.terminal_count(node.component) else {
                continue;
            };
            for terminal in 0..count {
                if terminal == node.terminal
                    || components
                        .internal_link(node.component, node.terminal, terminal, setup)
                        .is_none()
                {
                    continue;
                }
                let candidate = Node::new(node.component, terminal);
                if visited.contains(&candidate) {
                    continue;
                }
                let leaf = Leaf::new(node.component, node.terminal, terminal);
                if arrived.is_some_and(|prev| prev.same_element(&leaf)) {
                    continue;
                }

                self.branches += 1;
                if self.branches > options.max_branches {
                    self.halted = true;
                    self.diagnostics.push(Diagnostic::BranchLimit {
                        limit: options.max_branches,
                    });
                    break 'scan;
                }

                if let Some(rest) = self.explore(candidate, Some(leaf), visited.clone(), depth + 1)
                {
                    let mut steps = Vec::with_capacity(rest.len() + 1);
                    steps.push(Tree::Leaf(leaf));
                    steps.extend(rest);
                    branches.push(Tree::Series(steps));
                }
                if self.halted {
                    break 'scan;
                }
            }
        }

        tracing::trace!(%current, depth, found = branches.len(), "explored group");

        match branches.len() {
            0 => None,
            1 => branches.pop().map(Tree::into_elements),
            _ => {
                let mut merged = self.builder.merger.merge(branches);
                if merged.len() == 1 {
                    merged.pop().map(Tree::into_elements)
                } else {
                    Some(vec![Tree::Parallel(merged)])
                }
            }
        }
    }
}

/// Build the path tree between `start` and `end`.
///
/// Returns `Ok(None)` when no path exists. Diagnostics are logged and
/// dropped; use [`TreeBuilder::build`] to inspect them.
pub fn build_tree<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    start: Node,
    end: Node,
) -> Result<Option<Tree>, ReduceError> {
    TreeBuilder::new(netlist, components)
        .build(start, end)
        .map(|r| r.tree)
}

/// One build per snapshot, in order. Snapshots typically share groups and
/// differ in switch setup.
pub fn build_for_each_setup<C: Introspect + ?Sized>(
    netlists: &[Netlist],
    components: &C,
    start: Node,
    end: Node,
    options: BuildOptions,
) -> Result<Vec<Reduction>, ReduceError> {
    netlists
        .iter()
        .map(|nl| {
            TreeBuilder::new(nl, components)
                .with_options(options)
                .build(start, end)
        })
        .collect()
}

/// Like [`build_for_each_setup`], with snapshots searched on the rayon pool.
#[cfg(feature = "threadpool")]
pub fn build_for_each_setup_parallel<C: Introspect + Sync + ?Sized>(
    netlists: &[Netlist],
    components: &C,
    start: Node,
    end: Node,
    options: BuildOptions,
) -> Result<Vec<Reduction>, ReduceError> {
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    netlists
        .par_iter()
        .map(|nl| {
            TreeBuilder::new(nl, components)
                .with_options(options)
                .build(start, end)
        })
        .collect()
}
