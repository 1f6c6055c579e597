//! netreduce: reduce the wiring between two terminals of a circuit to a
//! series/parallel expression of the components a signal passes through.
//!
//! # Modules
//!
//! - [`netlist`]: terminals, wire-equivalent groups and netlist snapshots
//! - [`component`]: component introspection (terminals, internal links)
//! - [`tree`]: the `Leaf` / `Series` / `Parallel` path expression
//! - [`builder`]: depth-first path search between two terminals
//! - [`merge`]: factoring shared runs out of sibling branches
//! - [`query`]: locating terminals by component type or name
//! - [`validate`]: netlist checks run before a search
//! - [`dsl`]: nom-based parser for `.net` snapshot files
//! - [`config`]: YAML configuration for the command-line tool
//!
//! ```
//! use netreduce::{build_tree, dsl, Tree};
//!
//! let (components, netlists) = dsl::load_netlists(r#"
//!     netlist "pair" {
//!       components { IN: port  OUT: port  R1: resistor  R2: resistor }
//!       groups {
//!         IN.0, R1.0, R2.0
//!         R1.1, R2.1, OUT.0
//!       }
//!     }
//! "#).unwrap();
//! let from = dsl::parse_node(&components, "IN.0").unwrap();
//! let to = dsl::parse_node(&components, "OUT.0").unwrap();
//!
//! let tree = build_tree(&netlists[0], &components, from, to).unwrap().unwrap();
//! assert_eq!(
//!     tree.named(&components).to_string(),
//!     "Parallel[Series[R1(0>1)], Series[R2(0>1)]]"
//! );
//! assert!(matches!(tree.normalized(), Tree::Parallel(_)));
//! ```

pub mod builder;
pub mod component;
pub mod config;
pub mod dsl;
pub mod error;
pub mod merge;
pub mod netlist;
pub mod query;
pub mod tree;
pub mod validate;

pub use builder::{
    build_for_each_setup, build_tree, BuildOptions, CancelToken, Diagnostic, Reduction,
    TreeBuilder,
};
#[cfg(feature = "threadpool")]
pub use builder::build_for_each_setup_parallel;
pub use component::{Component, ComponentSet, InternalLink, Introspect};
pub use error::ReduceError;
pub use netlist::{ComponentId, Group, Netlist, Node, SwitchPosition};
pub use query::find_group;
pub use tree::{Leaf, Tree};
