//! Fison CLI — adaptive partitioned coupling runs.

use clap::{Parser, Subcommand};

mod commands;
mod demo;

#[derive(Parser)]
#[command(name = "fison")]
#[command(version, about = "Fison — adaptive partitioned fluid–structure coupling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the channel-flap scenario with adaptive refinement.
    Run {
        /// Path to a run configuration (JSON). Defaults are used when absent.
        #[arg(short, long)]
        config: Option<String>,

        /// Cap on outer refinement passes. Unbounded when absent.
        #[arg(long)]
        max_passes: Option<u32>,
    },

    /// Validate a run configuration and the scenario meshes.
    Validate {
        /// Path to a run configuration (JSON).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Summarize a stored run directory.
    Inspect {
        /// Path to an output directory written by `run`.
        path: String,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, max_passes } => commands::run(config.as_deref(), max_passes),
        Commands::Validate { config } => commands::validate(config.as_deref()),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
