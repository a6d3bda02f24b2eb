//! Run command: rehearse a catalog's full lifecycle with placeholder
//! extensions

use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use corext_core::{
    Capabilities, CatalogDiscoverer, Extension, ExtensionEntry, ExtensionError, ExtensionResult,
    LifecycleManager, TeardownReport,
};
use tracing::debug;

use super::load_catalog;
use crate::error::{CliError, Result};

/// Catalog key that makes a placeholder fail in the named phase.
const FAIL_ON_KEY: &str = "fail-on";

const PHASES: [&str; 4] = ["initialise", "start", "stop", "dispose"];

/// Inert extension standing in for a catalog entry.
#[derive(Debug)]
struct Placeholder {
    name: String,
    dependencies: Vec<String>,
    fail_on: Option<String>,
}

impl Placeholder {
    fn from_entry(entry: &ExtensionEntry) -> std::result::Result<Self, ExtensionError> {
        let fail_on = match entry.settings.get(FAIL_ON_KEY) {
            None => None,
            Some(value) => {
                let phase = value.as_str().filter(|p| PHASES.contains(p)).ok_or_else(|| {
                    ExtensionError::new(format!(
                        "'{FAIL_ON_KEY}' must be one of {} (extension '{}')",
                        PHASES.join(", "),
                        entry.name
                    ))
                })?;
                Some(phase.to_string())
            }
        };
        Ok(Self {
            name: entry.name.clone(),
            dependencies: entry.depends_on.clone(),
            fail_on,
        })
    }

    fn step(&self, phase: &str) -> ExtensionResult {
        debug!(extension = %self.name, phase, "Placeholder callback");
        if self.fail_on.as_deref() == Some(phase) {
            Err(ExtensionError::new(format!("rehearsed {phase} failure")))
        } else {
            Ok(())
        }
    }
}

impl Capabilities for Placeholder {}

impl Extension for Placeholder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn initialise(&mut self) -> ExtensionResult {
        self.step("initialise")
    }

    fn start(&mut self) -> ExtensionResult {
        self.step("start")
    }

    fn stop(&mut self) -> ExtensionResult {
        self.step("stop")
    }

    fn dispose(&mut self) -> ExtensionResult {
        self.step("dispose")
    }
}

/// Build a discoverer that turns every enabled entry into a placeholder.
fn placeholder_discoverer(config: corext_core::ExtensionsConfig) -> CatalogDiscoverer {
    let kinds: BTreeSet<String> = config.enabled().map(|e| e.kind().to_string()).collect();
    let mut discoverer = CatalogDiscoverer::new(config);
    for kind in kinds {
        discoverer.register(
            kind,
            |entry: &ExtensionEntry| -> std::result::Result<Box<dyn Extension>, ExtensionError> {
                Ok(Box::new(Placeholder::from_entry(entry)?))
            },
        );
    }
    discoverer
}

/// Run the lifecycle command
///
/// Teardown always runs, even when startup fails, and any failure makes the
/// command exit non-zero.
pub fn run_lifecycle(catalog: &Path) -> Result<()> {
    let config = load_catalog(catalog)?;
    let mut manager = LifecycleManager::new(placeholder_discoverer(config));

    let startup = manager.initialise().and_then(|()| {
        println!(
            "{} {}",
            "initialised".green().bold(),
            manager.ordered_names().join(" -> ")
        );
        manager.start()
    });
    match &startup {
        Ok(()) => println!("{} {} extensions", "started".green().bold(), manager.extension_count()),
        Err(e) => println!("{} {}", "startup failed:".red().bold(), e),
    }

    let stop = manager.stop();
    print_report("stopped", &stop);
    let dispose = manager.dispose();
    print_report("disposed", &dispose);
    println!("{} {}", "phase:".dimmed(), manager.phase());

    startup?;
    let failures = stop.errors().len() + dispose.errors().len();
    if failures > 0 {
        return Err(CliError::user(format!(
            "{failures} extension(s) failed during teardown"
        )));
    }
    Ok(())
}

fn print_report(label: &str, report: &TeardownReport) {
    if report.is_clean() {
        println!(
            "{} {}",
            label.green().bold(),
            report.attempted().join(", ")
        );
        return;
    }
    println!(
        "{} {} ({} failed)",
        label.yellow().bold(),
        report.attempted().join(", "),
        report.errors().len()
    );
    for error in report.errors() {
        println!("  {} {}", "-".red(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corext_core::{ExtensionsConfig, ManagerPhase};

    fn config(toml: &str) -> ExtensionsConfig {
        ExtensionsConfig::from_toml(toml).unwrap()
    }

    #[test]
    fn test_placeholder_reads_fail_on() {
        let config = config("[[extension]]\nname = \"a\"\nfail-on = \"stop\"\n");
        let mut placeholder = Placeholder::from_entry(&config.extensions[0]).unwrap();
        assert!(placeholder.start().is_ok());
        assert_eq!(
            placeholder.stop().unwrap_err().message(),
            "rehearsed stop failure"
        );
    }

    #[test]
    fn test_placeholder_rejects_unknown_phase() {
        let config = config("[[extension]]\nname = \"a\"\nfail-on = \"launch\"\n");
        let err = Placeholder::from_entry(&config.extensions[0]).unwrap_err();
        assert!(err.message().contains("must be one of"));
    }

    #[test]
    fn test_discoverer_covers_every_kind() {
        let config = config(
            "[[extension]]\nname = \"a\"\n\n[[extension]]\nname = \"b\"\nkind = \"shared\"\ndepends_on = [\"a\"]\n",
        );
        let discoverer = placeholder_discoverer(config);
        assert_eq!(discoverer.kinds(), vec!["a", "shared"]);

        let mut manager = LifecycleManager::new(discoverer);
        manager.initialise().unwrap();
        manager.start().unwrap();
        assert_eq!(manager.ordered_names(), vec!["a", "b"]);
        assert!(manager.stop().is_clean());
        assert!(manager.dispose().is_clean());
        assert_eq!(manager.phase(), ManagerPhase::Disposed);
    }
}
