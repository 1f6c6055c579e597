//! Integration tests for the reducer on the fixture circuits in `circuits/`.
//!
//! Each fixture is loaded through the `.net` parser, so these tests also
//! cover resolution of components, groups and switch setups.

use netreduce::builder::{build_for_each_setup, BuildOptions, Diagnostic, TreeBuilder};
use netreduce::component::ComponentSet;
use netreduce::dsl::{load_netlists, parse_node};
use netreduce::netlist::{Netlist, Node};
use netreduce::{build_tree, ReduceError, Tree};

fn load(name: &str) -> (ComponentSet, Vec<Netlist>) {
    let path = format!("{}/circuits/{}", env!("CARGO_MANIFEST_DIR"), name);
    let src = std::fs::read_to_string(&path).unwrap();
    load_netlists(&src).unwrap()
}

fn node(components: &ComponentSet, text: &str) -> Node {
    parse_node(components, text).unwrap()
}

fn reduce(name: &str, from: &str, to: &str) -> (ComponentSet, Option<Tree>) {
    let (components, netlists) = load(name);
    let tree = build_tree(
        &netlists[0],
        &components,
        node(&components, from),
        node(&components, to),
    )
    .unwrap();
    (components, tree)
}

// ===========================================================================
// Divider
// ===========================================================================

#[test_log::test]
fn divider_to_ground() {
    let (components, tree) = reduce("divider.net", "IN.0", "GND.0");
    let tree = tree.unwrap();
    assert_eq!(
        tree.named(&components).to_string(),
        "Parallel[Series[R1(0>1), Parallel[Series[R2(0>1)], Series[C1(0>1)]]]]"
    );
    assert_eq!(
        tree.normalized().named(&components).to_string(),
        "Series[R1(0>1), Parallel[R2(0>1), C1(0>1)]]"
    );
}

#[test]
fn divider_tap() {
    let (components, tree) = reduce("divider.net", "IN.0", "OUT.0");
    let r1 = components.by_name("R1").unwrap();
    assert_eq!(tree.unwrap().normalized(), Tree::leaf(r1, 0, 1));
}

#[test]
fn divider_reverse_direction() {
    let (components, tree) = reduce("divider.net", "GND.0", "IN.0");
    assert_eq!(
        tree.unwrap().normalized().named(&components).to_string(),
        "Series[Parallel[R2(1>0), C1(1>0)], R1(1>0)]"
    );
}

#[test]
fn same_group_is_a_wire() {
    let (_, tree) = reduce("divider.net", "R1.1", "OUT.0");
    let tree = tree.unwrap();
    assert_eq!(tree, Tree::Parallel(vec![Tree::wire()]));
    assert!(tree.leaves().is_empty());
}

#[test]
fn builds_are_deterministic() {
    let (components, netlists) = load("divider.net");
    let (start, end) = (node(&components, "IN.0"), node(&components, "GND.0"));
    let a = build_tree(&netlists[0], &components, start, end).unwrap();
    let b = build_tree(&netlists[0], &components, start, end).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.map(|t| t.to_string()),
        b.map(|t| t.to_string())
    );
}

// ===========================================================================
// Switch setups
// ===========================================================================

#[test]
fn tone_switch_every_setup() {
    let (components, netlists) = load("tone_switch.net");
    assert_eq!(netlists.len(), 3);

    let reductions = build_for_each_setup(
        &netlists,
        &components,
        node(&components, "IN.0"),
        node(&components, "OUT.0"),
        BuildOptions::default(),
    )
    .unwrap();

    let rendered: Vec<String> = reductions
        .iter()
        .map(|r| {
            r.tree
                .as_ref()
                .unwrap()
                .normalized()
                .named(&components)
                .to_string()
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            "Series[R1(0>1), SW1(0>1), C1(0>1)]",
            "Series[R1(0>1), SW1(0>2)]",
            "Series[R1(0>1), Parallel[Series[SW1(0>1), C1(0>1)], SW1(0>2)]]",
        ]
    );
    assert!(reductions.iter().all(|r| r.diagnostics.is_empty()));
    assert_eq!(
        reductions[2].switch_setup,
        vec!["SW1.bright".to_string(), "SW1.dark".to_string()]
    );
}

#[test]
fn open_switch_is_no_path() {
    let (components, netlists) = load("tone_switch.net");
    let open = netlists[0].with_switch_setup(Vec::new());
    let tree = build_tree(
        &open,
        &components,
        node(&components, "IN.0"),
        node(&components, "OUT.0"),
    )
    .unwrap();
    assert!(tree.is_none());
}

// ===========================================================================
// Bridges and limits
// ===========================================================================

#[test_log::test]
fn wheatstone_reports_possible_bridge() {
    let (components, netlists) = load("wheatstone.net");
    let reduction = TreeBuilder::new(&netlists[0], &components)
        .build(node(&components, "IN.0"), node(&components, "OUT.0"))
        .unwrap();

    let r5 = components.by_name("R5").unwrap();
    let tree = reduction.tree.as_ref().unwrap();
    let r5_leaves = tree.leaves().into_iter().filter(|l| l.component == r5).count();
    assert_eq!(r5_leaves, 2);
    assert!(reduction
        .diagnostics
        .contains(&Diagnostic::PossibleBridge { component: r5 }));
    assert!(!reduction.is_partial());
}

#[test]
fn depth_limit_on_fixture() {
    let (components, netlists) = load("divider.net");
    let reduction = TreeBuilder::new(&netlists[0], &components)
        .with_options(BuildOptions {
            max_depth: 1,
            ..BuildOptions::default()
        })
        .build(node(&components, "IN.0"), node(&components, "GND.0"))
        .unwrap();
    assert!(reduction.tree.is_none());
    assert!(reduction.is_partial());
}

#[test]
fn malformed_link_is_an_error() {
    let (components, netlists) = load("broken.net");
    let err = build_tree(
        &netlists[0],
        &components,
        node(&components, "IN.0"),
        node(&components, "R1.1"),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ReduceError::MalformedInternalLink { a: 0, b: 0, .. }
    ));
}

// ===========================================================================
// Output
// ===========================================================================

#[test]
fn reduction_serializes() {
    let (components, netlists) = load("divider.net");
    let reduction = TreeBuilder::new(&netlists[0], &components)
        .build(node(&components, "IN.0"), node(&components, "OUT.0"))
        .unwrap();
    let json = serde_json::to_value(&reduction).unwrap();
    let r1 = components.by_name("R1").unwrap().0;
    assert_eq!(
        json,
        serde_json::json!({
            "switch_setup": [],
            "tree": {"Parallel": [{"Series": [{"Leaf": {"component": r1, "entry": 0, "exit": 1}}]}]},
            "diagnostics": []
        })
    );
}
