//! Order command: print the activation order of a catalog

use std::path::Path;

use colored::Colorize;
use corext_core::dependency::{DependencyResolver, TopologicalResolver};
use corext_core::{ExtensionInfo, ExtensionOrder};
use serde::Serialize;

use super::load_catalog;
use crate::error::Result;

/// JSON shape of `corext order --json`.
#[derive(Debug, Serialize)]
struct OrderReport<'a> {
    order: Vec<&'a ExtensionInfo>,
    stop_order: Vec<&'a str>,
    disabled: Vec<&'a str>,
}

/// Run the order command
pub fn run_order(catalog: &Path, json: bool) -> Result<()> {
    let config = load_catalog(catalog)?;
    let order = TopologicalResolver.resolve(&config.infos())?;
    let disabled: Vec<&str> = config
        .extensions
        .iter()
        .filter(|entry| !entry.enabled)
        .map(|entry| entry.name.as_str())
        .collect();

    if json {
        let report = OrderReport {
            order: order.iter().collect(),
            stop_order: stop_names(&order),
            disabled,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} ({} extensions)",
        "Activation order".bold(),
        order.len()
    );
    for (i, info) in order.iter().enumerate() {
        if info.dependencies.is_empty() {
            println!("  {:>2}. {}", i + 1, info.name.green());
        } else {
            println!(
                "  {:>2}. {} {}",
                i + 1,
                info.name.green(),
                format!("(after {})", info.dependencies.join(", ")).dimmed()
            );
        }
    }
    if !disabled.is_empty() {
        println!();
        println!("{} {}", "Disabled:".dimmed(), disabled.join(", "));
    }
    Ok(())
}

fn stop_names(order: &ExtensionOrder) -> Vec<&str> {
    let mut names = order.names();
    names.reverse();
    names
}
