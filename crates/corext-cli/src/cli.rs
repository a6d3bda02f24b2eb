//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Core extension orchestrator - inspect and exercise extension catalogs
#[derive(Parser, Debug)]
#[command(name = "corext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the activation order of a catalog
    Order {
        /// Path to the catalog file or the directory holding extensions.toml
        #[arg(default_value = ".", env = "COREXT_CATALOG")]
        catalog: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate names, dependencies, and cycles in a catalog
    Check {
        /// Path to the catalog file or the directory holding extensions.toml
        #[arg(default_value = ".", env = "COREXT_CATALOG")]
        catalog: PathBuf,
    },

    /// Drive a catalog through the full lifecycle with placeholder extensions
    ///
    /// Each enabled entry becomes an inert extension. An entry can set
    /// `fail-on = "initialise" | "start" | "stop" | "dispose"` to rehearse a
    /// failure in that phase.
    Run {
        /// Path to the catalog file or the directory holding extensions.toml
        #[arg(default_value = ".", env = "COREXT_CATALOG")]
        catalog: PathBuf,
    },
}
