//! CLI `reduce` subcommand: print the path tree for every switch setup.

use std::process;

use netreduce::builder::{build_for_each_setup, Reduction};
use netreduce::config::ReduceConfig;
use netreduce::dsl::parse_node;
use serde::Serialize;

#[derive(Serialize)]
struct SetupOutput<'a> {
    switch_setup: &'a [String],
    tree: Option<netreduce::Tree>,
    diagnostics: Vec<String>,
}

pub fn run(file: &str, from: &str, to: &str, json: bool, normalize: bool, config: &ReduceConfig) {
    let (components, netlists) = super::load(file);

    let node = |text: &str| {
        parse_node(&components, text).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        })
    };
    let (start, end) = (node(from), node(to));

    let reductions = build_for_each_setup(&netlists, &components, start, end, config.limits)
        .unwrap_or_else(|e| {
            eprintln!("{file}: {e}");
            process::exit(1);
        });

    if json {
        let out: Vec<SetupOutput> = reductions
            .iter()
            .map(|r| SetupOutput {
                switch_setup: &r.switch_setup,
                tree: r.tree.as_ref().map(|t| shape(t, normalize)),
                diagnostics: r.diagnostics.iter().map(ToString::to_string).collect(),
            })
            .collect();
        match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error encoding JSON: {e}");
                process::exit(1);
            }
        }
        return;
    }

    for Reduction {
        switch_setup,
        tree,
        diagnostics,
    } in &reductions
    {
        let label = if switch_setup.is_empty() {
            "(no switches)".to_string()
        } else {
            switch_setup.join(", ")
        };
        match tree {
            Some(t) => println!("{label}: {}", shape(t, normalize).named(&components)),
            None => println!("{label}: no path"),
        }
        for d in diagnostics {
            eprintln!("  note: {d}");
        }
    }
}

fn shape(tree: &netreduce::Tree, normalize: bool) -> netreduce::Tree {
    if normalize {
        tree.normalized()
    } else {
        tree.clone()
    }
}
