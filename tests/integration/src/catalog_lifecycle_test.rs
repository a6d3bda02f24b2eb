//! End-to-end test for the catalog path
//!
//! This test exercises the complete flow: catalog file -> factory discovery
//! -> ordering -> capability wiring -> lifecycle -> teardown.

use std::fs;
use std::sync::{Arc, Mutex};

use corext_core::{
    ArtifactCategory, CATALOG_FILENAME, Capability, CatalogDiscoverer, Error, Extension,
    ExtensionEntry, ExtensionError, ExtensionsConfig, LifecycleManager, ManagerPhase,
};
use corext_test_utils::{
    CallJournal, Phase, Received, RecordingExtension, RecordingListener, Registration,
    full_services,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CATALOG: &str = r#"
[[extension]]
name = "console"
kind = "recording"
depends_on = ["deployer"]
capabilities = ["core-extensions-aware", "deployment-listener"]

[[extension]]
name = "deployer"
kind = "recording"
capabilities = ["deployment-service-aware", "artifact-deployment-listener"]

[[extension]]
name = "legacy"
kind = "recording"
enabled = false

[[extension]]
name = "tooling"
kind = "recording"
depends-on = ["deployer"]
capabilities = ["tooling-service-aware", "artifact-class-loader-manager-aware"]
"#;

/// Handles captured from the extensions a factory built.
#[derive(Default)]
struct Built {
    received: Vec<(String, Arc<Mutex<Received>>)>,
    listeners: Vec<(String, Arc<RecordingListener>)>,
}

fn parse_capability(name: &str) -> Result<Capability, ExtensionError> {
    Capability::ALL
        .into_iter()
        .find(|c| c.to_string() == name)
        .ok_or_else(|| ExtensionError::new(format!("unknown capability '{name}'")))
}

/// Factory that builds a `RecordingExtension` from a catalog entry, reading
/// its capabilities from the `capabilities` setting.
fn recording_factory(
    journal: &CallJournal,
    built: &Arc<Mutex<Built>>,
) -> impl Fn(&ExtensionEntry) -> Result<Box<dyn Extension>, ExtensionError> + Send + Sync + 'static
{
    let journal = journal.clone();
    let built = Arc::clone(built);
    move |entry: &ExtensionEntry| {
        let mut ext = RecordingExtension::new(&entry.name, &journal);
        for dep in &entry.depends_on {
            ext = ext.depends_on(dep);
        }
        if let Some(toml::Value::Array(names)) = entry.settings.get("capabilities") {
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| ExtensionError::new("capabilities must be strings"))?;
                ext = ext.with_capability(parse_capability(name)?);
            }
        }
        let mut built = built.lock().unwrap();
        built.received.push((entry.name.clone(), ext.received()));
        built.listeners.push((entry.name.clone(), ext.listener()));
        Ok(ext.boxed())
    }
}

fn write_catalog(content: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CATALOG_FILENAME), content).unwrap();
    temp
}

#[test]
fn test_catalog_to_teardown() {
    let temp = write_catalog(CATALOG);
    let config = ExtensionsConfig::load(temp.path().join(CATALOG_FILENAME)).unwrap();
    assert_eq!(config.extensions.len(), 4);

    let journal = CallJournal::new();
    let built = Arc::new(Mutex::new(Built::default()));
    let discoverer =
        CatalogDiscoverer::new(config).with_factory("recording", recording_factory(&journal, &built));
    let (services, deployment) = full_services();

    let mut manager = LifecycleManager::new(discoverer).with_services(services);
    manager.initialise().unwrap();

    // Disabled entries are never built.
    assert_eq!(manager.extension_count(), 3);
    assert_eq!(manager.state_of("legacy"), None);
    assert_eq!(manager.ordered_names(), vec!["deployer", "console", "tooling"]);

    // Two adapters for the artifact listener plus one generic registration.
    assert_eq!(
        deployment.registrations(),
        vec![
            Registration::Category(ArtifactCategory::Application),
            Registration::Category(ArtifactCategory::Domain),
            Registration::Generic,
        ]
    );

    let built = built.lock().unwrap();
    let received = |name: &str| {
        built
            .received
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| Arc::clone(r))
            .unwrap()
    };
    assert!(received("deployer").lock().unwrap().deployment.is_some());
    assert!(received("tooling").lock().unwrap().tooling.is_some());
    assert!(received("tooling").lock().unwrap().class_loader_manager.is_some());
    assert_eq!(
        received("console").lock().unwrap().core_extension_names(),
        Some(vec![
            "deployer".to_string(),
            "console".to_string(),
            "tooling".to_string(),
        ])
    );

    manager.start().unwrap();

    deployment.deploy(ArtifactCategory::Application, "orders");
    let listener = |name: &str| {
        built
            .listeners
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, l)| Arc::clone(l))
            .unwrap()
    };
    assert_eq!(
        listener("deployer").events(),
        vec![
            "deployment-start:application:orders",
            "deployment-success:application:orders",
        ]
    );
    assert_eq!(
        listener("console").events(),
        vec![
            "deployment-start:generic:orders",
            "deployment-success:generic:orders",
        ]
    );

    assert!(manager.stop().is_clean());
    assert!(manager.dispose().is_clean());
    assert_eq!(manager.phase(), ManagerPhase::Disposed);

    assert_eq!(journal.names_for(Phase::Stop), vec!["tooling", "console", "deployer"]);
    assert_eq!(journal.names_for(Phase::Dispose), vec!["console", "deployer", "tooling"]);
}

#[test]
fn test_unknown_kind_fails_initialise() {
    let config = ExtensionsConfig::from_toml("[[extension]]\nname = \"orphan\"\n").unwrap();
    let mut manager = LifecycleManager::new(CatalogDiscoverer::new(config));

    let err = manager.initialise().unwrap_err();
    assert!(matches!(
        err.root(),
        Error::UnknownKind { extension, kind } if extension == "orphan" && kind == "orphan"
    ));
    assert_eq!(manager.phase(), ManagerPhase::Failed);
}

#[test]
fn test_factory_error_fails_initialise() {
    let catalog = r#"
[[extension]]
name = "broken"
kind = "recording"
capabilities = ["teleport-aware"]
"#;
    let journal = CallJournal::new();
    let built = Arc::new(Mutex::new(Built::default()));
    let config = ExtensionsConfig::from_toml(catalog).unwrap();
    let discoverer =
        CatalogDiscoverer::new(config).with_factory("recording", recording_factory(&journal, &built));

    let mut manager = LifecycleManager::new(discoverer);
    let err = manager.initialise().unwrap_err();
    assert!(matches!(
        err.root(),
        Error::Discovery(e) if e.message() == "unknown capability 'teleport-aware'"
    ));
    assert!(journal.is_empty());
}

#[test]
fn test_missing_catalog_file() {
    let temp = TempDir::new().unwrap();
    let err = ExtensionsConfig::load(temp.path().join(CATALOG_FILENAME)).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}
