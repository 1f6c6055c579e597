use netreduce::component::Introspect;
use netreduce::query::find_nodes_by_type;

/// List matching terminals with the index of their group.
pub fn run(file: &str, types: &[String], name: Option<&str>) {
    let (components, netlists) = super::load(file);
    let Some(netlist) = netlists.first() else {
        return;
    };

    let types: Vec<&str> = types.iter().map(String::as_str).collect();
    let nodes = find_nodes_by_type(netlist, &components, &types, name);
    if nodes.is_empty() {
        eprintln!("No matching terminals.");
        std::process::exit(1);
    }
    for node in nodes {
        let label = components.display_name(node.component).unwrap_or("?");
        let kind = components.type_id(node.component).unwrap_or("?");
        match netlist.group_index(&node) {
            Some(g) => println!("{label}.{}\t{kind}\tgroup {g}", node.terminal),
            None => println!("{label}.{}\t{kind}", node.terminal),
        }
    }
}
