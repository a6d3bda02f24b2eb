//! Host service handles handed to extensions during wiring.
//!
//! The host runtime owns these services; the lifecycle manager only keeps a
//! shared handle to each one and passes clones to the extensions that ask for
//! them through a capability.

use std::fmt;
use std::sync::Arc;

use crate::listener::{ArtifactCategory, DeploymentListener};

/// Deploys and undeploys artifacts, and notifies registered listeners.
pub trait DeploymentService: Send + Sync + fmt::Debug {
    /// Register a listener for application deployments.
    fn add_deployment_listener(&self, listener: Arc<dyn DeploymentListener>);

    /// Register a listener for deployments of a single artifact category.
    fn add_deployment_listener_for(
        &self,
        listener: Arc<dyn DeploymentListener>,
        category: ArtifactCategory,
    );
}

/// Resolves and stores deployable bundles.
pub trait RepositoryService: Send + Sync + fmt::Debug {}

/// Runs tooling requests (design-time operations) against the runtime.
pub trait ToolingService: Send + Sync + fmt::Debug {}

/// Tracks the class loaders created for deployed artifacts.
pub trait ArtifactClassLoaderManager: Send + Sync + fmt::Debug {}

/// Identifies one of the host services an extension may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostService {
    Deployment,
    Repository,
    Tooling,
    ArtifactClassLoaderManager,
}

impl fmt::Display for HostService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployment => write!(f, "deployment service"),
            Self::Repository => write!(f, "repository service"),
            Self::Tooling => write!(f, "tooling service"),
            Self::ArtifactClassLoaderManager => write!(f, "artifact class loader manager"),
        }
    }
}

/// The set of host service handles available for injection.
///
/// Every handle is optional: a handle that was never set is only an error if
/// an extension asks for it.
#[derive(Debug, Clone, Default)]
pub struct HostServices {
    pub deployment: Option<Arc<dyn DeploymentService>>,
    pub repository: Option<Arc<dyn RepositoryService>>,
    pub tooling: Option<Arc<dyn ToolingService>>,
    pub class_loader_manager: Option<Arc<dyn ArtifactClassLoaderManager>>,
}

impl HostServices {
    /// Create an empty service table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given service has been configured.
    pub fn is_configured(&self, service: HostService) -> bool {
        match service {
            HostService::Deployment => self.deployment.is_some(),
            HostService::Repository => self.repository.is_some(),
            HostService::Tooling => self.tooling.is_some(),
            HostService::ArtifactClassLoaderManager => self.class_loader_manager.is_some(),
        }
    }
}
