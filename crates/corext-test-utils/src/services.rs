//! Host service doubles.

use std::sync::{Arc, Mutex, MutexGuard};

use corext_core::{
    ArtifactCategory, ArtifactClassLoaderManager, DeploymentListener, DeploymentService,
    HostServices, RepositoryService, ToolingService,
};

/// How a listener was registered with [`RecordingDeploymentService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Through `add_deployment_listener`.
    Generic,
    /// Through `add_deployment_listener_for`.
    Category(ArtifactCategory),
}

/// Deployment service that records registrations and can fire events.
///
/// Generic listeners receive application events, as the deployment service
/// treats an uncategorised registration as an application listener.
#[derive(Default)]
pub struct RecordingDeploymentService {
    listeners: Mutex<Vec<(Registration, Arc<dyn DeploymentListener>)>>,
}

impl std::fmt::Debug for RecordingDeploymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDeploymentService")
            .field("registrations", &self.registrations())
            .finish()
    }
}

impl RecordingDeploymentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration, in order.
    pub fn registrations(&self) -> Vec<Registration> {
        self.lock().iter().map(|(kind, _)| *kind).collect()
    }

    /// Number of registrations of the given kind.
    pub fn count(&self, registration: Registration) -> usize {
        self.lock()
            .iter()
            .filter(|(kind, _)| *kind == registration)
            .count()
    }

    /// Simulate a successful deployment of `artifact`.
    pub fn deploy(&self, category: ArtifactCategory, artifact: &str) {
        for listener in self.listeners_for(category) {
            listener.on_deployment_start(artifact);
            listener.on_deployment_success(artifact);
        }
    }

    /// Simulate a failed deployment of `artifact`.
    pub fn fail_deployment(&self, category: ArtifactCategory, artifact: &str, cause: &str) {
        for listener in self.listeners_for(category) {
            listener.on_deployment_start(artifact);
            listener.on_deployment_failure(artifact, cause);
        }
    }

    /// Simulate a successful undeployment of `artifact`.
    pub fn undeploy(&self, category: ArtifactCategory, artifact: &str) {
        for listener in self.listeners_for(category) {
            listener.on_undeployment_start(artifact);
            listener.on_undeployment_success(artifact);
        }
    }

    fn listeners_for(&self, category: ArtifactCategory) -> Vec<Arc<dyn DeploymentListener>> {
        self.lock()
            .iter()
            .filter(|(kind, _)| match kind {
                Registration::Generic => category == ArtifactCategory::Application,
                Registration::Category(c) => *c == category,
            })
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Registration, Arc<dyn DeploymentListener>)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|e| panic!("RecordingDeploymentService: lock poisoned: {e}"))
    }
}

impl DeploymentService for RecordingDeploymentService {
    fn add_deployment_listener(&self, listener: Arc<dyn DeploymentListener>) {
        self.lock().push((Registration::Generic, listener));
    }

    fn add_deployment_listener_for(
        &self,
        listener: Arc<dyn DeploymentListener>,
        category: ArtifactCategory,
    ) {
        self.lock().push((Registration::Category(category), listener));
    }
}

#[derive(Debug, Default)]
pub struct StubRepository;

impl RepositoryService for StubRepository {}

#[derive(Debug, Default)]
pub struct StubTooling;

impl ToolingService for StubTooling {}

#[derive(Debug, Default)]
pub struct StubClassLoaderManager;

impl ArtifactClassLoaderManager for StubClassLoaderManager {}

/// A service table with every handle configured, plus the deployment
/// service so tests can inspect registrations.
pub fn full_services() -> (HostServices, Arc<RecordingDeploymentService>) {
    let deployment = Arc::new(RecordingDeploymentService::new());
    let services = HostServices {
        deployment: Some(deployment.clone()),
        repository: Some(Arc::new(StubRepository)),
        tooling: Some(Arc::new(StubTooling)),
        class_loader_manager: Some(Arc::new(StubClassLoaderManager)),
    };
    (services, deployment)
}
