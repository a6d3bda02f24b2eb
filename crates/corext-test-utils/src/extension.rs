//! [`RecordingExtension`]: a scriptable extension that logs every call.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use corext_core::capability::{
    ArtifactClassLoaderManagerAware, CoreExtensionsAware, DeploymentServiceAware,
    RepositoryServiceAware, ToolingServiceAware,
};
use corext_core::{
    ArtifactCategory, ArtifactClassLoaderManager, ArtifactDeploymentListener, Capabilities,
    Capability, CoreExtensions, DeploymentListener, DeploymentService, Extension, ExtensionError,
    ExtensionResult, RepositoryService, ToolingService,
};

use crate::journal::{CallJournal, Phase};

/// Host handles an extension received during wiring.
#[derive(Debug, Default)]
pub struct Received {
    pub deployment: Option<Arc<dyn DeploymentService>>,
    pub repository: Option<Arc<dyn RepositoryService>>,
    pub tooling: Option<Arc<dyn ToolingService>>,
    pub class_loader_manager: Option<Arc<dyn ArtifactClassLoaderManager>>,
    pub core_extensions: Option<CoreExtensions>,
}

impl Received {
    /// Names in the received core extension list, if any.
    pub fn core_extension_names(&self) -> Option<Vec<String>> {
        self.core_extensions
            .as_ref()
            .map(|list| list.iter().map(|info| info.name.clone()).collect())
    }
}

/// Deployment listener that records every event as `event:category:artifact`.
///
/// Events received through the generic [`DeploymentListener`] interface are
/// recorded with the category `generic`.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn push(&self, event: &str, category: &str, artifact: &str) {
        self.lock().push(format!("{event}:{category}:{artifact}"));
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.events
            .lock()
            .unwrap_or_else(|e| panic!("RecordingListener: lock poisoned: {e}"))
    }
}

impl ArtifactDeploymentListener for RecordingListener {
    fn on_deployment_start(&self, category: ArtifactCategory, artifact: &str) {
        self.push("deployment-start", &category.to_string(), artifact);
    }

    fn on_deployment_success(&self, category: ArtifactCategory, artifact: &str) {
        self.push("deployment-success", &category.to_string(), artifact);
    }

    fn on_deployment_failure(&self, category: ArtifactCategory, artifact: &str, _cause: &str) {
        self.push("deployment-failure", &category.to_string(), artifact);
    }

    fn on_undeployment_start(&self, category: ArtifactCategory, artifact: &str) {
        self.push("undeployment-start", &category.to_string(), artifact);
    }

    fn on_undeployment_success(&self, category: ArtifactCategory, artifact: &str) {
        self.push("undeployment-success", &category.to_string(), artifact);
    }
}

impl DeploymentListener for RecordingListener {
    fn on_deployment_start(&self, artifact: &str) {
        self.push("deployment-start", "generic", artifact);
    }

    fn on_deployment_success(&self, artifact: &str) {
        self.push("deployment-success", "generic", artifact);
    }

    fn on_deployment_failure(&self, artifact: &str, _cause: &str) {
        self.push("deployment-failure", "generic", artifact);
    }

    fn on_undeployment_start(&self, artifact: &str) {
        self.push("undeployment-start", "generic", artifact);
    }

    fn on_undeployment_success(&self, artifact: &str) {
        self.push("undeployment-success", "generic", artifact);
    }
}

/// An extension whose behaviour is scripted by the test.
///
/// # Example
///
/// ```rust
/// use corext_core::Capability;
/// use corext_test_utils::{CallJournal, Phase, RecordingExtension};
///
/// let journal = CallJournal::new();
/// let ext = RecordingExtension::new("metrics", &journal)
///     .depends_on("logging")
///     .with_capability(Capability::ToolingServiceAware)
///     .failing_on(Phase::Start);
/// assert_eq!(ext.received().lock().unwrap().tooling.is_none(), true);
/// ```
pub struct RecordingExtension {
    name: String,
    dependencies: Vec<String>,
    journal: CallJournal,
    fail_on: HashSet<Phase>,
    capabilities: BTreeSet<Capability>,
    received: Arc<Mutex<Received>>,
    listener: Arc<RecordingListener>,
}

impl RecordingExtension {
    /// Create an extension with no dependencies or capabilities that logs
    /// into `journal`.
    pub fn new(name: impl Into<String>, journal: &CallJournal) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            journal: journal.clone(),
            fail_on: HashSet::new(),
            capabilities: BTreeSet::new(),
            received: Arc::default(),
            listener: Arc::default(),
        }
    }

    /// Declare a dependency.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Make the given call fail. For `Phase::Wire`, the setter of that
    /// capability fails.
    pub fn failing_on(mut self, phase: Phase) -> Self {
        self.fail_on.insert(phase);
        self
    }

    /// Expose a capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Expose every capability.
    pub fn with_all_capabilities(mut self) -> Self {
        self.capabilities.extend(Capability::ALL);
        self
    }

    /// Shared view of the handles received during wiring.
    pub fn received(&self) -> Arc<Mutex<Received>> {
        Arc::clone(&self.received)
    }

    /// The listener registered for the listener capabilities.
    pub fn listener(&self) -> Arc<RecordingListener> {
        Arc::clone(&self.listener)
    }

    pub fn boxed(self) -> Box<dyn Extension> {
        Box::new(self)
    }

    fn call(&self, phase: Phase) -> ExtensionResult {
        self.journal.record(&self.name, phase);
        if self.fail_on.contains(&phase) {
            Err(ExtensionError::new(format!("{} failed on {phase}", self.name)))
        } else {
            Ok(())
        }
    }

    fn wire(&self, capability: Capability, store: impl FnOnce(&mut Received)) -> ExtensionResult {
        self.call(Phase::Wire(capability))?;
        let mut received = self
            .received
            .lock()
            .unwrap_or_else(|e| panic!("RecordingExtension: lock poisoned: {e}"));
        store(&mut received);
        Ok(())
    }

    fn exposes(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl DeploymentServiceAware for RecordingExtension {
    fn set_deployment_service(&mut self, service: Arc<dyn DeploymentService>) -> ExtensionResult {
        self.wire(Capability::DeploymentServiceAware, |r| {
            r.deployment = Some(service)
        })
    }
}

impl RepositoryServiceAware for RecordingExtension {
    fn set_repository_service(&mut self, service: Arc<dyn RepositoryService>) -> ExtensionResult {
        self.wire(Capability::RepositoryServiceAware, |r| {
            r.repository = Some(service)
        })
    }
}

impl ToolingServiceAware for RecordingExtension {
    fn set_tooling_service(&mut self, service: Arc<dyn ToolingService>) -> ExtensionResult {
        self.wire(Capability::ToolingServiceAware, |r| r.tooling = Some(service))
    }
}

impl ArtifactClassLoaderManagerAware for RecordingExtension {
    fn set_artifact_class_loader_manager(
        &mut self,
        manager: Arc<dyn ArtifactClassLoaderManager>,
    ) -> ExtensionResult {
        self.wire(Capability::ArtifactClassLoaderManagerAware, |r| {
            r.class_loader_manager = Some(manager)
        })
    }
}

impl CoreExtensionsAware for RecordingExtension {
    fn set_core_extensions(&mut self, extensions: CoreExtensions) -> ExtensionResult {
        self.wire(Capability::CoreExtensionsAware, |r| {
            r.core_extensions = Some(extensions)
        })
    }
}

impl Capabilities for RecordingExtension {
    fn as_deployment_service_aware(&mut self) -> Option<&mut dyn DeploymentServiceAware> {
        if self.exposes(Capability::DeploymentServiceAware) {
            Some(self)
        } else {
            None
        }
    }

    fn as_repository_service_aware(&mut self) -> Option<&mut dyn RepositoryServiceAware> {
        if self.exposes(Capability::RepositoryServiceAware) {
            Some(self)
        } else {
            None
        }
    }

    fn as_tooling_service_aware(&mut self) -> Option<&mut dyn ToolingServiceAware> {
        if self.exposes(Capability::ToolingServiceAware) {
            Some(self)
        } else {
            None
        }
    }

    fn as_artifact_class_loader_manager_aware(
        &mut self,
    ) -> Option<&mut dyn ArtifactClassLoaderManagerAware> {
        if self.exposes(Capability::ArtifactClassLoaderManagerAware) {
            Some(self)
        } else {
            None
        }
    }

    fn as_core_extensions_aware(&mut self) -> Option<&mut dyn CoreExtensionsAware> {
        if self.exposes(Capability::CoreExtensionsAware) {
            Some(self)
        } else {
            None
        }
    }

    fn artifact_deployment_listener(&self) -> Option<Arc<dyn ArtifactDeploymentListener>> {
        self.exposes(Capability::ArtifactDeploymentListener)
            .then(|| Arc::clone(&self.listener) as Arc<dyn ArtifactDeploymentListener>)
    }

    fn deployment_listener(&self) -> Option<Arc<dyn DeploymentListener>> {
        self.exposes(Capability::DeploymentListener)
            .then(|| Arc::clone(&self.listener) as Arc<dyn DeploymentListener>)
    }
}

impl Extension for RecordingExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn initialise(&mut self) -> ExtensionResult {
        self.call(Phase::Initialise)
    }

    fn start(&mut self) -> ExtensionResult {
        self.call(Phase::Start)
    }

    fn stop(&mut self) -> ExtensionResult {
        self.call(Phase::Stop)
    }

    fn dispose(&mut self) -> ExtensionResult {
        self.call(Phase::Dispose)
    }
}
