//! Extension discovery.
//!
//! How candidate extensions are located is up to the host; the manager only
//! needs an [`ExtensionDiscoverer`]. [`CatalogDiscoverer`] is the stock
//! implementation: it reads an [`ExtensionsConfig`] and builds each enabled
//! entry with the factory registered for its kind.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::config::{ExtensionEntry, ExtensionsConfig};
use crate::error::{Error, ExtensionError, Result};
use crate::extension::Extension;

/// Produces the set of extensions to manage, in discovery order.
pub trait ExtensionDiscoverer: fmt::Debug {
    /// Discover the extensions.
    ///
    /// # Errors
    ///
    /// Any error aborts the manager's initialise phase.
    fn discover(&self) -> Result<Vec<Box<dyn Extension>>>;
}

/// Builds an extension from its catalog entry.
pub trait ExtensionFactory: Send + Sync {
    fn create(&self, entry: &ExtensionEntry) -> std::result::Result<Box<dyn Extension>, ExtensionError>;
}

impl<F> ExtensionFactory for F
where
    F: Fn(&ExtensionEntry) -> std::result::Result<Box<dyn Extension>, ExtensionError> + Send + Sync,
{
    fn create(&self, entry: &ExtensionEntry) -> std::result::Result<Box<dyn Extension>, ExtensionError> {
        self(entry)
    }
}

/// Discovers extensions from a catalog and a table of factories.
pub struct CatalogDiscoverer {
    config: ExtensionsConfig,
    factories: HashMap<String, Box<dyn ExtensionFactory>>,
}

impl CatalogDiscoverer {
    /// Create a discoverer over `config` with no factories registered.
    pub fn new(config: ExtensionsConfig) -> Self {
        Self {
            config,
            factories: HashMap::new(),
        }
    }

    /// Register the factory for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, factory: impl ExtensionFactory + 'static) {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Builder-style [`CatalogDiscoverer::register`].
    pub fn with_factory(
        mut self,
        kind: impl Into<String>,
        factory: impl ExtensionFactory + 'static,
    ) -> Self {
        self.register(kind, factory);
        self
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn config(&self) -> &ExtensionsConfig {
        &self.config
    }
}

impl fmt::Debug for CatalogDiscoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogDiscoverer")
            .field("config", &self.config)
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl ExtensionDiscoverer for CatalogDiscoverer {
    fn discover(&self) -> Result<Vec<Box<dyn Extension>>> {
        let mut extensions = Vec::new();
        for entry in self.config.enabled() {
            let factory = self
                .factories
                .get(entry.kind())
                .ok_or_else(|| Error::UnknownKind {
                    extension: entry.name.clone(),
                    kind: entry.kind().to_string(),
                })?;
            let extension = factory.create(entry).map_err(Error::Discovery)?;
            if extension.name() != entry.name {
                return Err(Error::Discovery(ExtensionError::new(format!(
                    "factory for kind '{}' built '{}' for catalog entry '{}'",
                    entry.kind(),
                    extension.name(),
                    entry.name
                ))));
            }
            debug!(extension = %entry.name, kind = %entry.kind(), "Discovered extension");
            extensions.push(extension);
        }
        Ok(extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::extension::ExtensionResult;

    struct Named {
        name: String,
        deps: Vec<String>,
    }

    impl Capabilities for Named {}

    impl Extension for Named {
        fn name(&self) -> &str {
            &self.name
        }

        fn dependencies(&self) -> &[String] {
            &self.deps
        }

        fn initialise(&mut self) -> ExtensionResult {
            Ok(())
        }

        fn start(&mut self) -> ExtensionResult {
            Ok(())
        }

        fn stop(&mut self) -> ExtensionResult {
            Ok(())
        }

        fn dispose(&mut self) -> ExtensionResult {
            Ok(())
        }
    }

    fn named(entry: &ExtensionEntry) -> std::result::Result<Box<dyn Extension>, ExtensionError> {
        Ok(Box::new(Named {
            name: entry.name.clone(),
            deps: entry.depends_on.clone(),
        }))
    }

    fn catalog(toml: &str) -> ExtensionsConfig {
        ExtensionsConfig::from_toml(toml).unwrap()
    }

    #[test]
    fn discovers_enabled_entries_in_catalog_order() {
        let discoverer = CatalogDiscoverer::new(catalog(
            r#"
[[extension]]
name = "b"
kind = "plain"
depends_on = ["a"]

[[extension]]
name = "skipped"
kind = "plain"
enabled = false

[[extension]]
name = "a"
kind = "plain"
"#,
        ))
        .with_factory("plain", named);

        let found = discoverer.discover().unwrap();
        let names: Vec<&str> = found.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(found[0].dependencies(), &["a".to_string()]);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let discoverer = CatalogDiscoverer::new(catalog("[[extension]]\nname = \"ghost\"\n"));
        let err = discoverer.discover().unwrap_err();
        assert!(matches!(err, Error::UnknownKind { kind, .. } if kind == "ghost"));
    }

    #[test]
    fn factory_failure_becomes_discovery_error() {
        let discoverer = CatalogDiscoverer::new(catalog("[[extension]]\nname = \"broken\"\n"))
            .with_factory("broken", |_: &ExtensionEntry| {
                Err::<Box<dyn Extension>, _>(ExtensionError::new("missing native library"))
            });
        let err = discoverer.discover().unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(err.to_string().contains("missing native library"));
    }

    #[test]
    fn factory_must_honour_entry_name() {
        let discoverer = CatalogDiscoverer::new(catalog("[[extension]]\nname = \"wanted\"\n"))
            .with_factory("wanted", |_: &ExtensionEntry| {
                Ok::<Box<dyn Extension>, ExtensionError>(Box::new(Named {
                    name: "other".to_string(),
                    deps: vec![],
                }))
            });
        let err = discoverer.discover().unwrap_err();
        assert!(err.to_string().contains("'other'"), "got: {err}");
    }

    #[test]
    fn kinds_are_sorted() {
        let discoverer = CatalogDiscoverer::new(ExtensionsConfig::default())
            .with_factory("zeta", named)
            .with_factory("alpha", named);
        assert_eq!(discoverer.kinds(), vec!["alpha", "zeta"]);
        assert!(discoverer.discover().unwrap().is_empty());
    }
}
