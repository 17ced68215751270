//! CLI argument parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "memsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a sweep against an HTTP control plane
    Run {
        /// Path to the run configuration file (JSON)
        #[arg(short, long)]
        config: String,
        /// Base URL of the control plane
        #[arg(short, long)]
        endpoint: String,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the run configuration file (JSON)
        #[arg(short, long)]
        config: String,
    },
}
