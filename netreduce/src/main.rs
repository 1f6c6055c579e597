mod cli;

use clap::{Parser, Subcommand};

use netreduce::config::ReduceConfig;

#[derive(Parser)]
#[command(
    name = "netreduce",
    about = "Reduce the wiring between two terminals to a series/parallel tree"
)]
struct Cli {
    /// YAML configuration file (search limits, log filter).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the path tree between two terminals for every switch setup.
    Reduce {
        /// Path to the .net snapshot file.
        file: String,
        /// Start terminal, e.g. IN.0
        from: String,
        /// End terminal, e.g. OUT.0
        to: String,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Flatten single-child containers before printing.
        #[arg(long)]
        normalize: bool,
    },
    /// List terminals of components matching a type (and optionally a name).
    Query {
        /// Path to the .net snapshot file.
        file: String,
        /// Component type, e.g. resistor. Repeatable.
        #[arg(long = "type", required = true)]
        types: Vec<String>,
        /// Exact component name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Lint a .net file.
    Check {
        /// Path to the .net snapshot file.
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReduceConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading {path}: {e}");
            std::process::exit(1);
        }),
        None => ReduceConfig::default(),
    };
    cli::init_logging(&config, cli.verbose);

    match cli.command {
        Command::Reduce {
            file,
            from,
            to,
            json,
            normalize,
        } => cli::reduce::run(&file, &from, &to, json, normalize || config.normalize, &config),
        Command::Query { file, types, name } => cli::query::run(&file, &types, name.as_deref()),
        Command::Check { file } => cli::check::run(&file),
    }
}
