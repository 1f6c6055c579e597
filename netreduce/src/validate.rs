//! Validation of netlist snapshots against their components.
//!
//! [`validate_netlist`] collects every issue it can find, for the `check`
//! command and for loaders that want to surface problems early.
//! [`ensure_well_formed`] is the strict subset the path search depends on:
//! it fails on the first error so that a bad internal link is reported
//! before the search starts instead of halfway through it.
//!
//! # Warning codes
//!
//! - `unknown-component` (error): a group references a component that does not exist
//! - `terminal-out-of-range` (error): a group references a terminal the component lacks
//! - `self-link` (error): an internal link joins a terminal to itself
//! - `link-out-of-range` (error): an internal link names a terminal the component lacks
//! - `floating-group` (info): a group with a single terminal
//! - `unconnected-terminal` (info): a terminal of a used component is in no group

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::component::Introspect;
use crate::error::ReduceError;
use crate::netlist::{ComponentId, Netlist, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Legal but worth a look (dangling wires, unused pins).
    Info,
    /// Probably a mistake; the search still runs.
    Warning,
    /// The path search refuses this netlist.
    Error,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetlistWarning {
    pub severity: Severity,
    /// Short machine-readable code (e.g. "self-link").
    pub code: &'static str,
    pub message: String,
}

impl fmt::Display for NetlistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] {}: {}", tag, self.code, self.message)
    }
}

/// Validate a snapshot and return all findings, errors first in the order
/// the checks run.
pub fn validate_netlist<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
) -> Vec<NetlistWarning> {
    let mut warnings = Vec::new();

    check_node_references(netlist, components, &mut warnings);
    check_internal_links(netlist, components, &mut warnings);
    check_floating_groups(netlist, components, &mut warnings);
    check_unconnected_terminals(netlist, components, &mut warnings);

    warnings
}

/// Whether any finding is an error.
pub fn has_errors(warnings: &[NetlistWarning]) -> bool {
    warnings.iter().any(|w| w.severity == Severity::Error)
}

/// Fail on the first structural problem the path search cannot handle.
pub fn ensure_well_formed<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
) -> Result<(), ReduceError> {
    for node in netlist.nodes() {
        let count = components
            .terminal_count(node.component)
            .ok_or_else(|| ReduceError::UnknownComponent(node.component.to_string()))?;
        if node.terminal >= count {
            return Err(ReduceError::TerminalOutOfRange {
                component: label(components, node.component),
                terminal: node.terminal,
                count,
            });
        }
    }
    for id in referenced(netlist) {
        let count = components.terminal_count(id).unwrap_or(0);
        for link in components.links(id) {
            if let Some(reason) = link_problem(link.a, link.b, count) {
                return Err(ReduceError::MalformedInternalLink {
                    component: id,
                    a: link.a,
                    b: link.b,
                    reason,
                });
            }
        }
    }
    Ok(())
}

fn link_problem(a: usize, b: usize, count: usize) -> Option<&'static str> {
    if a == b {
        Some("joins a terminal to itself")
    } else if a >= count || b >= count {
        Some("terminal out of range")
    } else {
        None
    }
}

/// Components referenced by at least one node, in id order.
fn referenced(netlist: &Netlist) -> BTreeSet<ComponentId> {
    netlist.nodes().map(|n| n.component).collect()
}

fn label<C: Introspect + ?Sized>(components: &C, id: ComponentId) -> String {
    components
        .display_name(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════
// Individual checks
// ═══════════════════════════════════════════════════════════════════════════

fn check_node_references<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    w: &mut Vec<NetlistWarning>,
) {
    let mut reported: HashSet<ComponentId> = HashSet::new();
    for node in netlist.nodes() {
        match components.terminal_count(node.component) {
            None => {
                if reported.insert(node.component) {
                    w.push(NetlistWarning {
                        severity: Severity::Error,
                        code: "unknown-component",
                        message: format!("Group references unknown component {}", node.component),
                    });
                }
            }
            Some(count) if node.terminal >= count => w.push(NetlistWarning {
                severity: Severity::Error,
                code: "terminal-out-of-range",
                message: format!(
                    "'{}' has {} terminal(s) but terminal {} is wired",
                    label(components, node.component),
                    count,
                    node.terminal
                ),
            }),
            Some(_) => {}
        }
    }
}

fn check_internal_links<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    w: &mut Vec<NetlistWarning>,
) {
    for id in referenced(netlist) {
        let Some(count) = components.terminal_count(id) else {
            continue;
        };
        for link in components.links(id) {
            let code = match link_problem(link.a, link.b, count) {
                Some(_) if link.a == link.b => "self-link",
                Some(_) => "link-out-of-range",
                None => continue,
            };
            w.push(NetlistWarning {
                severity: Severity::Error,
                code,
                message: format!(
                    "'{}' link {} joins {}-{} ({} terminals)",
                    label(components, id),
                    link.label(),
                    link.a,
                    link.b,
                    count
                ),
            });
        }
    }
}

fn check_floating_groups<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    w: &mut Vec<NetlistWarning>,
) {
    for (i, group) in netlist.groups().iter().enumerate() {
        if let [only] = group.nodes() {
            w.push(NetlistWarning {
                severity: Severity::Info,
                code: "floating-group",
                message: format!(
                    "Group {} only contains {}.{}",
                    i,
                    label(components, only.component),
                    only.terminal
                ),
            });
        }
    }
}

fn check_unconnected_terminals<C: Introspect + ?Sized>(
    netlist: &Netlist,
    components: &C,
    w: &mut Vec<NetlistWarning>,
) {
    for id in referenced(netlist) {
        let Some(count) = components.terminal_count(id) else {
            continue;
        };
        for terminal in 0..count {
            if netlist.group_of(&Node::new(id, terminal)).is_none() {
                w.push(NetlistWarning {
                    severity: Severity::Info,
                    code: "unconnected-terminal",
                    message: format!(
                        "Terminal {}.{} is not wired to anything",
                        label(components, id),
                        terminal
                    ),
                });
            }
        }
    }
}
