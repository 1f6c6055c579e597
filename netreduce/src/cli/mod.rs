pub mod check;
pub mod query;
pub mod reduce;

use netreduce::component::ComponentSet;
use netreduce::config::ReduceConfig;
use netreduce::dsl::load_netlists;
use netreduce::netlist::Netlist;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins, then `-v`, then the
/// config file's filter.
pub fn init_logging(config: &ReduceConfig, verbose: u8) {
    let fallback = match verbose {
        0 => config.log_filter.clone(),
        1 => "netreduce=debug".to_string(),
        _ => "netreduce=trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and resolve a `.net` file, exiting with a message on failure.
pub fn load(path: &str) -> (ComponentSet, Vec<Netlist>) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {path}: {e}");
        std::process::exit(1);
    });
    load_netlists(&source).unwrap_or_else(|e| {
        eprintln!("{path}: {e}");
        std::process::exit(1);
    })
}
