//! Parser for `.net` netlist snapshot files.
//!
//! ```text
//! netlist "Tone stack" {
//!   components {
//!     IN: port
//!     R1: resistor
//!     SW1: switch(3) [0-1 @ SW1.a, 0-2 "throw" @ SW1.b]
//!   }
//!   groups {
//!     IN.0, R1.0        # one group per line
//!     R1.1, SW1.0
//!   }
//!   switches { SW1.a }  # one snapshot per block
//!   switches { SW1.b }
//! }
//! ```
//!
//! Parsing produces a [`NetlistDef`]; [`NetlistDef::resolve`] turns it into
//! a [`ComponentSet`] and one [`Netlist`] per `switches` block.

use std::collections::HashSet;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, space0},
    combinator::{map_res, opt, recognize, value},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::component::{Component, ComponentSet, InternalLink};
use crate::error::ReduceError;
use crate::netlist::{Group, Netlist, Node, SwitchPosition};

// ---------------------------------------------------------------------------
// AST
// ---------------------------------------------------------------------------

/// A parsed `.net` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetlistDef {
    pub name: String,
    pub components: Vec<ComponentDef>,
    pub groups: Vec<Vec<PinRef>>,
    /// One entry per `switches` block.
    pub setups: Vec<Vec<SwitchPosition>>,
}

/// `SW1: switch(3) [0-1 @ SW1.a]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDef {
    pub id: String,
    pub kind: String,
    pub terminals: Option<usize>,
    /// Explicit links; `None` keeps the kind's defaults.
    pub links: Option<Vec<InternalLink>>,
}

/// `R1.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRef {
    pub component: String,
    pub terminal: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Consume whitespace **and** `# …` comments.
fn ws_comments(input: &str) -> IResult<&str, ()> {
    let (input, _) = many0(alt((
        value((), multispace1),
        value((), pair(char('#'), not_line_ending)),
    )))(input)?;
    Ok((input, ()))
}

/// Identifier: starts with alpha/underscore, continues with alphanumeric/underscore.
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

/// Quoted string: `"Foo Bar"`
fn quoted_string(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"'))(input)
}

/// `SW1.bright`, `SW2.3`, or a bare `BYPASS`.
fn switch_position(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        identifier,
        opt(pair(
            char('.'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    ))(input)
}

/// `, ` with any whitespace or comments around the comma.
fn list_sep(input: &str) -> IResult<&str, ()> {
    let (input, _) = tuple((ws_comments, char(','), ws_comments))(input)?;
    Ok((input, ()))
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// `0-2 "throw" @ SW1.b`
fn link_def(input: &str) -> IResult<&str, InternalLink> {
    let (input, a) = number(input)?;
    let (input, _) = char('-')(input)?;
    let (input, b) = number(input)?;
    let (input, name) = opt(preceded(ws_comments, quoted_string))(input)?;
    let (input, when) = opt(preceded(
        tuple((ws_comments, char('@'), ws_comments)),
        switch_position,
    ))(input)?;

    let mut link = InternalLink::new(a, b);
    if let Some(name) = name {
        link = link.named(name);
    }
    if let Some(when) = when {
        link = link.when(when);
    }
    Ok((input, link))
}

fn link_list(input: &str) -> IResult<&str, Vec<InternalLink>> {
    delimited(
        pair(char('['), ws_comments),
        separated_list0(list_sep, link_def),
        pair(ws_comments, char(']')),
    )(input)
}

fn terminal_count(input: &str) -> IResult<&str, usize> {
    delimited(
        pair(char('('), ws_comments),
        number,
        pair(ws_comments, char(')')),
    )(input)
}

/// `R1: resistor`, `Q1: npn(3) [1-2 "ce"]`
fn component_def(input: &str) -> IResult<&str, ComponentDef> {
    let (input, _) = ws_comments(input)?;
    let (input, id) = identifier(input)?;
    let (input, _) = ws_comments(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = ws_comments(input)?;
    let (input, kind) = identifier(input)?;
    let (input, terminals) = opt(preceded(space0, terminal_count))(input)?;
    let (input, links) = opt(preceded(space0, link_list))(input)?;
    Ok((
        input,
        ComponentDef {
            id: id.to_string(),
            kind: kind.to_string(),
            terminals,
            links,
        },
    ))
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

fn pin(input: &str) -> IResult<&str, PinRef> {
    let (input, component) = identifier(input)?;
    let (input, _) = char('.')(input)?;
    let (input, terminal) = number(input)?;
    Ok((
        input,
        PinRef {
            component: component.to_string(),
            terminal,
        },
    ))
}

/// One line of comma-separated pins.
fn group_def(input: &str) -> IResult<&str, Vec<PinRef>> {
    let (input, _) = ws_comments(input)?;
    separated_list1(tuple((space0, char(','), space0)), pin)(input)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn section<'a, O>(
    name: &'static str,
    body: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(
        tuple((ws_comments, tag(name), ws_comments, char('{'))),
        body,
        pair(ws_comments, char('}')),
    )
}

fn components_section(input: &str) -> IResult<&str, Vec<ComponentDef>> {
    section("components", many0(component_def))(input)
}

fn groups_section(input: &str) -> IResult<&str, Vec<Vec<PinRef>>> {
    section("groups", many0(group_def))(input)
}

fn switches_section(input: &str) -> IResult<&str, Vec<SwitchPosition>> {
    let (input, positions) = section(
        "switches",
        preceded(ws_comments, separated_list0(list_sep, switch_position)),
    )(input)?;
    Ok((input, positions.into_iter().map(str::to_string).collect()))
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

/// Parse a complete `.net` file.
pub fn parse_netlist(input: &str) -> IResult<&str, NetlistDef> {
    let (input, _) = ws_comments(input)?;
    let (input, _) = tag("netlist")(input)?;
    let (input, _) = ws_comments(input)?;
    let (input, name) = quoted_string(input)?;
    let (input, _) = ws_comments(input)?;
    let (input, _) = char('{')(input)?;

    let (input, components) = components_section(input)?;
    let (input, groups) = groups_section(input)?;
    let (input, setups) = many0(switches_section)(input)?;

    let (input, _) = ws_comments(input)?;
    let (input, _) = char('}')(input)?;
    let (input, _) = ws_comments(input)?;

    Ok((
        input,
        NetlistDef {
            name: name.to_string(),
            components,
            groups,
            setups,
        },
    ))
}

/// Convenience wrapper that returns `Result`.
pub fn parse_netlist_file(src: &str) -> Result<NetlistDef, ReduceError> {
    match parse_netlist(src) {
        Ok(("", def)) => Ok(def),
        Ok((rest, _)) => Err(ReduceError::Parse(format!(
            "Trailing input: {:?}",
            rest.chars().take(60).collect::<String>()
        ))),
        Err(e) => Err(ReduceError::Parse(e.to_string())),
    }
}

/// Parse and resolve in one step.
pub fn load_netlists(src: &str) -> Result<(ComponentSet, Vec<Netlist>), ReduceError> {
    parse_netlist_file(src)?.resolve()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Terminal count and links for kinds that have them built in.
fn default_shape(kind: &str) -> Option<(usize, Vec<InternalLink>)> {
    match kind {
        "resistor" | "capacitor" | "cap" | "inductor" | "diode" | "fuse" | "lamp" => {
            Some((2, vec![InternalLink::new(0, 1).named("body")]))
        }
        "pot" => Some((
            3,
            vec![
                InternalLink::new(0, 1),
                InternalLink::new(1, 2),
                InternalLink::new(0, 2),
            ],
        )),
        "port" => Some((1, Vec::new())),
        _ => None,
    }
}

impl ComponentDef {
    fn to_component(&self) -> Result<Component, ReduceError> {
        let shape = default_shape(&self.kind);
        let terminals = match (self.terminals, &shape) {
            (Some(n), _) => n,
            (None, Some((n, _))) => *n,
            (None, None) => {
                return Err(ReduceError::Parse(format!(
                    "Component '{}' of kind '{}' needs a terminal count, e.g. {}(2)",
                    self.id, self.kind, self.kind
                )))
            }
        };
        let links = match (&self.links, shape) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some((_, defaults))) => defaults,
            (None, None) => Vec::new(),
        };
        Ok(Component {
            name: self.id.clone(),
            kind: self.kind.clone(),
            terminals,
            links,
        })
    }
}

impl NetlistDef {
    /// Build the component set and one snapshot per switch setup.
    pub fn resolve(&self) -> Result<(ComponentSet, Vec<Netlist>), ReduceError> {
        let mut components = ComponentSet::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for def in &self.components {
            if !seen.insert(def.id.as_str()) {
                return Err(ReduceError::DuplicateComponent(def.id.clone()));
            }
            components.add(def.to_component()?);
        }

        let groups = self
            .groups
            .iter()
            .map(|pins| {
                pins.iter()
                    .map(|p| resolve_pin(&components, &p.component, p.terminal))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Group::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let first_setup = self.setups.first().cloned().unwrap_or_default();
        let base = Netlist::new(groups, first_setup)?;
        let mut netlists = Vec::with_capacity(self.setups.len().max(1));
        for setup in self.setups.iter().skip(1) {
            netlists.push(base.with_switch_setup(setup.clone()));
        }
        netlists.insert(0, base);

        tracing::debug!(
            name = %self.name,
            components = components.len(),
            snapshots = netlists.len(),
            "resolved netlist"
        );
        Ok((components, netlists))
    }
}

fn resolve_pin(
    components: &ComponentSet,
    name: &str,
    terminal: usize,
) -> Result<Node, ReduceError> {
    let id = components
        .by_name(name)
        .ok_or_else(|| ReduceError::UnknownComponent(name.to_string()))?;
    let count = components.get(id).map(|c| c.terminals).unwrap_or(0);
    if terminal >= count {
        return Err(ReduceError::TerminalOutOfRange {
            component: name.to_string(),
            terminal,
            count,
        });
    }
    Ok(Node::new(id, terminal))
}

/// Resolve a `Component.terminal` reference such as `"R1.0"`.
pub fn parse_node(components: &ComponentSet, text: &str) -> Result<Node, ReduceError> {
    match pin(text.trim()) {
        Ok(("", p)) => resolve_pin(components, &p.component, p.terminal),
        _ => Err(ReduceError::Parse(format!(
            "Expected Component.terminal, got {text:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Introspect;

    const TONE: &str = r#"
# Two-way tone switch
netlist "Tone" {
  components {
    IN: port
    OUT: port
    R1: resistor
    C1: cap
    SW1: switch(3) [0-1 @ SW1.a, 0-2 "throw" @ SW1.b]
  }
  groups {
    IN.0, R1.0
    R1.1, SW1.0   # wiper
    SW1.1, C1.0
    SW1.2, C1.1, OUT.0
  }
  switches { SW1.a }
  switches { SW1.b }
}
"#;

    #[test]
    fn parse_tone() {
        let def = parse_netlist_file(TONE).unwrap();
        assert_eq!(def.name, "Tone");
        assert_eq!(def.components.len(), 5);
        assert_eq!(def.groups.len(), 4);
        assert_eq!(
            def.groups[1],
            vec![
                PinRef {
                    component: "R1".into(),
                    terminal: 1
                },
                PinRef {
                    component: "SW1".into(),
                    terminal: 0
                },
            ]
        );
        assert_eq!(def.setups, vec![vec!["SW1.a".to_string()], vec!["SW1.b".to_string()]]);
    }

    #[test]
    fn parse_links() {
        let (_, c) = component_def(r#"SW1: switch(3) [0-1 @ SW1.a, 0-2 "throw" @ SW1.b]"#).unwrap();
        assert_eq!(c.terminals, Some(3));
        assert_eq!(
            c.links,
            Some(vec![
                InternalLink::new(0, 1).when("SW1.a"),
                InternalLink::new(0, 2).named("throw").when("SW1.b"),
            ])
        );
    }

    #[test]
    fn default_shapes() {
        let src = r#"netlist "d" {
            components {
                R1: resistor
                P1: pot
                J1: port(2)
                Q1: npn(3)
                R2: resistor [ ]
            }
            groups { R1.0, P1.0 }
        }"#;
        let (set, netlists) = load_netlists(src).unwrap();
        let id = |n: &str| set.by_name(n).unwrap();

        assert_eq!(set.terminal_count(id("R1")), Some(2));
        assert_eq!(set.internal_link(id("R1"), 1, 0, &[]).as_deref(), Some("body"));
        assert_eq!(set.links(id("P1")).len(), 3);
        assert_eq!(set.terminal_count(id("J1")), Some(2));
        assert!(set.links(id("J1")).is_empty());
        assert!(set.links(id("Q1")).is_empty());
        // Explicit empty list replaces the default link.
        assert!(set.links(id("R2")).is_empty());

        assert_eq!(netlists.len(), 1);
        assert!(netlists[0].switch_setup().is_empty());
    }

    #[test]
    fn resolve_one_snapshot_per_setup() {
        let (set, netlists) = load_netlists(TONE).unwrap();
        assert_eq!(netlists.len(), 2);
        assert_eq!(netlists[1].switch_setup(), &["SW1.b".to_string()]);
        assert_eq!(netlists[0].groups(), netlists[1].groups());
        let out = parse_node(&set, "OUT.0").unwrap();
        let c1 = parse_node(&set, "C1.1").unwrap();
        assert!(netlists[0].same_group(&out, &c1));
    }

    #[test]
    fn unknown_kind_needs_terminal_count() {
        let src = r#"netlist "x" { components { U1: opamp } groups { } }"#;
        assert!(matches!(load_netlists(src), Err(ReduceError::Parse(_))));
    }

    #[test]
    fn duplicate_component() {
        let src = r#"netlist "x" { components { R1: resistor R1: cap } groups { } }"#;
        assert_eq!(
            load_netlists(src).unwrap_err(),
            ReduceError::DuplicateComponent("R1".into())
        );
    }

    #[test]
    fn unknown_pin_reference() {
        let src = r#"netlist "x" { components { R1: resistor } groups { R1.0, R9.1 } }"#;
        assert_eq!(
            load_netlists(src).unwrap_err(),
            ReduceError::UnknownComponent("R9".into())
        );
    }

    #[test]
    fn pin_out_of_range() {
        let src = r#"netlist "x" { components { R1: resistor } groups { R1.2 } }"#;
        assert!(matches!(
            load_netlists(src),
            Err(ReduceError::TerminalOutOfRange { terminal: 2, count: 2, .. })
        ));
    }

    #[test]
    fn node_in_two_groups() {
        let src = "netlist \"x\" { components { R1: resistor R2: resistor }\n groups {\n R1.0, R2.0\n R2.0, R1.1\n } }";
        assert!(matches!(load_netlists(src), Err(ReduceError::DuplicateNode(_))));
    }

    #[test]
    fn trailing_input_rejected() {
        let src = r#"netlist "x" { components { } groups { } } extra"#;
        assert!(matches!(parse_netlist_file(src), Err(ReduceError::Parse(_))));
    }

    #[test]
    fn parse_node_reference() {
        let (set, _) = load_netlists(TONE).unwrap();
        let sw = set.by_name("SW1").unwrap();
        assert_eq!(parse_node(&set, " SW1.2 ").unwrap(), Node::new(sw, 2));
        assert!(matches!(parse_node(&set, "SW1"), Err(ReduceError::Parse(_))));
        assert!(matches!(
            parse_node(&set, "NOPE.0"),
            Err(ReduceError::UnknownComponent(_))
        ));
    }
}
