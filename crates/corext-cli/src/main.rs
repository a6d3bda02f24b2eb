//! corext CLI
//!
//! Inspect extension catalogs and rehearse their lifecycle.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{} tracing subscriber already set", "warning:".yellow().bold());
        }
        debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} core extension orchestrator", "corext".green().bold());
            println!();
            println!("Run {} for available commands.", "corext --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Order { catalog, json } => commands::run_order(&catalog, json),
        Commands::Check { catalog } => commands::run_check(&catalog),
        Commands::Run { catalog } => commands::run_lifecycle(&catalog),
    }
}
