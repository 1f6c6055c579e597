//! CLI `check` subcommand: lint a `.net` file.

use netreduce::validate::{has_errors, validate_netlist, Severity};

pub fn run(file: &str) {
    let (components, netlists) = super::load(file);
    let Some(netlist) = netlists.first() else {
        return;
    };

    let warnings = validate_netlist(netlist, &components);
    for w in &warnings {
        let (color, tag) = match w.severity {
            Severity::Info => ("\x1b[36m", "info"),
            Severity::Warning => ("\x1b[33m", "warning"),
            Severity::Error => ("\x1b[31m", "error"),
        };
        eprintln!("  {color}{tag}\x1b[0m[{}]: {}", w.code, w.message);
    }

    let errors = warnings
        .iter()
        .filter(|w| w.severity == Severity::Error)
        .count();
    eprintln!(
        "{file}: {} error(s), {} note(s)",
        errors,
        warnings.len() - errors
    );
    if has_errors(&warnings) {
        std::process::exit(1);
    }
}
