//! Command implementations for corext-cli

pub mod check;
pub mod order;
pub mod run;

use std::path::{Path, PathBuf};

use corext_core::{CATALOG_FILENAME, ExtensionsConfig};

use crate::error::Result;

pub use check::run_check;
pub use order::run_order;
pub use run::run_lifecycle;

/// Resolve a catalog argument to a file: directories are searched for
/// `extensions.toml`.
pub fn catalog_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CATALOG_FILENAME)
    } else {
        path.to_path_buf()
    }
}

/// Load the catalog named by a command-line argument.
pub fn load_catalog(path: &Path) -> Result<ExtensionsConfig> {
    Ok(ExtensionsConfig::load(catalog_path(path))?)
}
