//! Check command: validate a catalog without running it

use std::path::Path;

use colored::Colorize;
use corext_core::dependency::{DependencyResolver, TopologicalResolver};

use super::{catalog_path, load_catalog};
use crate::error::Result;

/// Run the check command
///
/// Loading validates extension names; resolution validates duplicates,
/// dependency references, and cycles. Any failure is returned so the
/// process exits non-zero.
pub fn run_check(catalog: &Path) -> Result<()> {
    let file = catalog_path(catalog);
    let config = load_catalog(catalog)?;
    let infos = config.infos();
    let order = TopologicalResolver.resolve(&infos)?;

    let disabled = config.extensions.len() - infos.len();
    println!(
        "{} {} is valid: {} extensions can be ordered",
        "OK".green().bold(),
        file.display(),
        order.len()
    );
    if disabled > 0 {
        println!("   {} disabled entries were skipped", disabled.to_string().dimmed());
    }
    Ok(())
}
