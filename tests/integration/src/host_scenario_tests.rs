//! Host-side scenarios: a host configures its services one by one, then
//! drives the extension set the way a runtime would at boot and shutdown.

use std::sync::Arc;

use corext_core::{
    ArtifactCategory, Capability, Error, ExtensionState, HostService, LifecycleManager,
    ManagerPhase,
};
use corext_test_utils::{
    CallJournal, Phase, RecordingDeploymentService, RecordingExtension, StubClassLoaderManager,
    StubRepository, StubTooling, VecDiscoverer,
};
use pretty_assertions::assert_eq;

fn discoverer(extensions: Vec<RecordingExtension>) -> VecDiscoverer {
    VecDiscoverer::new(extensions.into_iter().map(RecordingExtension::boxed).collect())
}

#[test]
fn test_host_configures_services_individually() {
    let journal = CallJournal::new();
    let ext = RecordingExtension::new("everything", &journal).with_all_capabilities();
    let received = ext.received();
    let deployment = Arc::new(RecordingDeploymentService::new());

    let mut manager = LifecycleManager::new(discoverer(vec![ext]));
    manager.set_deployment_service(deployment.clone());
    manager.set_repository_service(Arc::new(StubRepository));
    manager.set_tooling_service(Arc::new(StubTooling));
    manager.set_artifact_class_loader_manager(Arc::new(StubClassLoaderManager));
    for service in [
        HostService::Deployment,
        HostService::Repository,
        HostService::Tooling,
        HostService::ArtifactClassLoaderManager,
    ] {
        assert!(manager.services().is_configured(service));
    }

    manager.initialise().unwrap();

    let received = received.lock().unwrap();
    assert!(received.deployment.is_some());
    assert!(received.repository.is_some());
    assert!(received.tooling.is_some());
    assert!(received.class_loader_manager.is_some());
    assert_eq!(
        received.core_extension_names(),
        Some(vec!["everything".to_string()])
    );
    assert_eq!(deployment.registrations().len(), 3);
    assert_eq!(
        manager.capabilities_of("everything").unwrap().len(),
        Capability::ALL.len()
    );
}

#[test]
fn test_builder_style_configuration() {
    let journal = CallJournal::new();
    let ext = RecordingExtension::new("tools", &journal)
        .with_capability(Capability::ToolingServiceAware)
        .with_capability(Capability::ArtifactClassLoaderManagerAware);

    let mut manager = LifecycleManager::new(discoverer(vec![ext]))
        .with_tooling_service(Arc::new(StubTooling))
        .with_artifact_class_loader_manager(Arc::new(StubClassLoaderManager));
    manager.initialise().unwrap();

    assert!(!manager.services().is_configured(HostService::Deployment));
    assert_eq!(manager.state_of("tools"), Some(ExtensionState::Initialised));
}

#[test]
fn test_boot_then_shutdown_with_domain_traffic() {
    let journal = CallJournal::new();
    let domains = RecordingExtension::new("domain-watcher", &journal)
        .with_capability(Capability::ArtifactDeploymentListener);
    let apps = RecordingExtension::new("app-watcher", &journal)
        .depends_on("domain-watcher")
        .with_capability(Capability::DeploymentListener);
    let domain_events = domains.listener();
    let app_events = apps.listener();
    let deployment = Arc::new(RecordingDeploymentService::new());

    let mut manager = LifecycleManager::new(discoverer(vec![apps, domains]))
        .with_deployment_service(deployment.clone());
    manager.initialise().unwrap();
    manager.start().unwrap();

    deployment.deploy(ArtifactCategory::Domain, "default");
    deployment.deploy(ArtifactCategory::Application, "billing");
    deployment.undeploy(ArtifactCategory::Application, "billing");

    assert_eq!(
        domain_events.events(),
        vec![
            "deployment-start:domain:default",
            "deployment-success:domain:default",
            "deployment-start:application:billing",
            "deployment-success:application:billing",
            "undeployment-start:application:billing",
            "undeployment-success:application:billing",
        ]
    );
    // The generic listener only hears about applications.
    assert_eq!(
        app_events.events(),
        vec![
            "deployment-start:generic:billing",
            "deployment-success:generic:billing",
            "undeployment-start:generic:billing",
            "undeployment-success:generic:billing",
        ]
    );

    assert!(manager.stop().is_clean());
    assert!(manager.dispose().is_clean());
    assert_eq!(journal.names_for(Phase::Stop), vec!["app-watcher", "domain-watcher"]);
    assert_eq!(journal.names_for(Phase::Dispose), vec!["app-watcher", "domain-watcher"]);
}

#[test]
fn test_start_failure_scenario() {
    let journal = CallJournal::new();
    let mut manager = LifecycleManager::new(discoverer(vec![
        RecordingExtension::new("a", &journal),
        RecordingExtension::new("b", &journal)
            .depends_on("a")
            .failing_on(Phase::Start),
        RecordingExtension::new("c", &journal).depends_on("b"),
    ]));

    manager.initialise().unwrap();
    let err = manager.start().unwrap_err();
    assert!(matches!(err, Error::StartFailure { ref extension, .. } if extension == "b"));

    assert_eq!(manager.state_of("a"), Some(ExtensionState::Started));
    assert_eq!(manager.state_of("b"), Some(ExtensionState::Failed));
    assert_eq!(journal.count("c", Phase::Start), 0);

    let report = manager.stop();
    assert!(report.is_clean());
    assert_eq!(journal.names_for(Phase::Stop), vec!["c", "b", "a"]);

    let report = manager.dispose();
    assert!(report.is_clean());
    assert_eq!(manager.phase(), ManagerPhase::Failed);
}

#[test]
fn test_missing_deployment_service_for_listener() {
    let journal = CallJournal::new();
    let ext = RecordingExtension::new("watcher", &journal)
        .with_capability(Capability::ArtifactDeploymentListener);

    let mut manager = LifecycleManager::new(discoverer(vec![ext]))
        .with_repository_service(Arc::new(StubRepository));
    let err = manager.initialise().unwrap_err();

    assert_eq!(
        err.to_string(),
        "Initialisation failed for extension 'watcher': Extension 'watcher' requires the deployment service but none was configured"
    );
}
