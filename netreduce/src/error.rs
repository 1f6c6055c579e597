//! Error types for loading and reducing netlists.

use thiserror::Error;

use crate::netlist::{ComponentId, Node};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown component {0}")]
    UnknownComponent(String),
    #[error("Terminal {terminal} is out of range for component {component} ({count} terminals)")]
    TerminalOutOfRange {
        component: String,
        terminal: usize,
        count: usize,
    },
    #[error("Node {0} appears in more than one group")]
    DuplicateNode(Node),
    #[error("Component '{0}' declared more than once")]
    DuplicateComponent(String),
    #[error("Malformed internal link on component {component}: {a}-{b} ({reason})")]
    MalformedInternalLink {
        component: ComponentId,
        a: usize,
        b: usize,
        reason: &'static str,
    },
}
