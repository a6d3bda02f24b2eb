//! Optional capability interfaces and their detection.
//!
//! An extension opts into a host service by implementing the matching
//! `*Aware` trait and returning itself from the corresponding probe on
//! [`Capabilities`]. Listener capabilities hand out a shared listener
//! instead, because the deployment service keeps it after wiring.
//!
//! ```
//! use std::sync::Arc;
//! use corext_core::capability::{Capabilities, Capability, CapabilitySet, ToolingServiceAware};
//! use corext_core::services::ToolingService;
//! use corext_core::{Extension, ExtensionResult};
//!
//! struct Inspector {
//!     tooling: Option<Arc<dyn ToolingService>>,
//! }
//!
//! impl ToolingServiceAware for Inspector {
//!     fn set_tooling_service(&mut self, service: Arc<dyn ToolingService>) -> ExtensionResult {
//!         self.tooling = Some(service);
//!         Ok(())
//!     }
//! }
//!
//! impl Capabilities for Inspector {
//!     fn as_tooling_service_aware(&mut self) -> Option<&mut dyn ToolingServiceAware> {
//!         Some(self)
//!     }
//! }
//!
//! impl Extension for Inspector {
//!     fn name(&self) -> &str { "inspector" }
//!     fn initialise(&mut self) -> ExtensionResult { Ok(()) }
//!     fn start(&mut self) -> ExtensionResult { Ok(()) }
//!     fn stop(&mut self) -> ExtensionResult { Ok(()) }
//!     fn dispose(&mut self) -> ExtensionResult { Ok(()) }
//! }
//!
//! let mut ext = Inspector { tooling: None };
//! let caps = CapabilitySet::detect(&mut ext);
//! assert!(caps.contains(Capability::ToolingServiceAware));
//! assert_eq!(caps.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::extension::{ExtensionInfo, ExtensionResult};
use crate::listener::{ArtifactDeploymentListener, DeploymentListener};
use crate::services::{
    ArtifactClassLoaderManager, DeploymentService, HostService, RepositoryService, ToolingService,
};

/// Read-only view of the ordered extension list.
pub type CoreExtensions = Arc<[ExtensionInfo]>;

/// Receives the host deployment service.
pub trait DeploymentServiceAware {
    fn set_deployment_service(&mut self, service: Arc<dyn DeploymentService>) -> ExtensionResult;
}

/// Receives the host repository service.
pub trait RepositoryServiceAware {
    fn set_repository_service(&mut self, service: Arc<dyn RepositoryService>) -> ExtensionResult;
}

/// Receives the host tooling service.
pub trait ToolingServiceAware {
    fn set_tooling_service(&mut self, service: Arc<dyn ToolingService>) -> ExtensionResult;
}

/// Receives the artifact class loader manager.
pub trait ArtifactClassLoaderManagerAware {
    fn set_artifact_class_loader_manager(
        &mut self,
        manager: Arc<dyn ArtifactClassLoaderManager>,
    ) -> ExtensionResult;
}

/// Receives the full ordered extension list.
pub trait CoreExtensionsAware {
    fn set_core_extensions(&mut self, extensions: CoreExtensions) -> ExtensionResult;
}

/// Probes for the optional interfaces an extension implements.
///
/// Every probe defaults to `None`. Probes are independent of each other and
/// the injector may call them in any order.
pub trait Capabilities {
    fn as_deployment_service_aware(&mut self) -> Option<&mut dyn DeploymentServiceAware> {
        None
    }

    fn as_repository_service_aware(&mut self) -> Option<&mut dyn RepositoryServiceAware> {
        None
    }

    fn as_tooling_service_aware(&mut self) -> Option<&mut dyn ToolingServiceAware> {
        None
    }

    fn as_artifact_class_loader_manager_aware(
        &mut self,
    ) -> Option<&mut dyn ArtifactClassLoaderManagerAware> {
        None
    }

    fn as_core_extensions_aware(&mut self) -> Option<&mut dyn CoreExtensionsAware> {
        None
    }

    /// Listener registered once per artifact category.
    fn artifact_deployment_listener(&self) -> Option<Arc<dyn ArtifactDeploymentListener>> {
        None
    }

    /// Listener registered directly with the deployment service.
    fn deployment_listener(&self) -> Option<Arc<dyn DeploymentListener>> {
        None
    }
}

/// One of the capability interfaces recognised during wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    DeploymentServiceAware,
    RepositoryServiceAware,
    ToolingServiceAware,
    ArtifactClassLoaderManagerAware,
    CoreExtensionsAware,
    ArtifactDeploymentListener,
    DeploymentListener,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::DeploymentServiceAware,
        Capability::RepositoryServiceAware,
        Capability::ToolingServiceAware,
        Capability::ArtifactClassLoaderManagerAware,
        Capability::CoreExtensionsAware,
        Capability::ArtifactDeploymentListener,
        Capability::DeploymentListener,
    ];

    /// The host service that must be configured before this capability can
    /// be wired.
    pub fn required_service(self) -> Option<HostService> {
        match self {
            Self::DeploymentServiceAware
            | Self::ArtifactDeploymentListener
            | Self::DeploymentListener => Some(HostService::Deployment),
            Self::RepositoryServiceAware => Some(HostService::Repository),
            Self::ToolingServiceAware => Some(HostService::Tooling),
            Self::ArtifactClassLoaderManagerAware => Some(HostService::ArtifactClassLoaderManager),
            Self::CoreExtensionsAware => None,
        }
    }

    /// Whether `extension` exposes this capability.
    pub fn is_supported_by<E: Capabilities + ?Sized>(self, extension: &mut E) -> bool {
        match self {
            Self::DeploymentServiceAware => extension.as_deployment_service_aware().is_some(),
            Self::RepositoryServiceAware => extension.as_repository_service_aware().is_some(),
            Self::ToolingServiceAware => extension.as_tooling_service_aware().is_some(),
            Self::ArtifactClassLoaderManagerAware => extension
                .as_artifact_class_loader_manager_aware()
                .is_some(),
            Self::CoreExtensionsAware => extension.as_core_extensions_aware().is_some(),
            Self::ArtifactDeploymentListener => extension.artifact_deployment_listener().is_some(),
            Self::DeploymentListener => extension.deployment_listener().is_some(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeploymentServiceAware => "deployment-service-aware",
            Self::RepositoryServiceAware => "repository-service-aware",
            Self::ToolingServiceAware => "tooling-service-aware",
            Self::ArtifactClassLoaderManagerAware => "artifact-class-loader-manager-aware",
            Self::CoreExtensionsAware => "core-extensions-aware",
            Self::ArtifactDeploymentListener => "artifact-deployment-listener",
            Self::DeploymentListener => "deployment-listener",
        };
        f.write_str(name)
    }
}

/// The capabilities detected on one extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    capabilities: BTreeSet<Capability>,
}

impl CapabilitySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe every known capability on `extension`.
    pub fn detect<E: Capabilities + ?Sized>(extension: &mut E) -> Self {
        Capability::ALL
            .into_iter()
            .filter(|capability| capability.is_supported_by(extension))
            .collect()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Host services this set needs, without duplicates.
    pub fn required_services(&self) -> Vec<HostService> {
        let mut services: Vec<HostService> = Vec::new();
        for service in self.iter().filter_map(Capability::required_service) {
            if !services.contains(&service) {
                services.push(service);
            }
        }
        services
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}
