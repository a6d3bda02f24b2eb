//! Capability injection: hands host services to the extensions that ask
//! for them.

use std::sync::Arc;

use tracing::debug;

use crate::capability::{Capability, CapabilitySet, CoreExtensions};
use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::listener::{ArtifactCategory, DeploymentListenerAdapter};
use crate::services::{DeploymentService, HostService, HostServices};

/// Wires host services into extensions according to their capabilities.
///
/// Every capability is handled on its own; no setter relies on another
/// capability of the same extension having been wired first.
#[derive(Debug)]
pub struct CapabilityInjector<'a> {
    services: &'a HostServices,
    core_extensions: CoreExtensions,
}

impl<'a> CapabilityInjector<'a> {
    pub fn new(services: &'a HostServices, core_extensions: CoreExtensions) -> Self {
        Self {
            services,
            core_extensions,
        }
    }

    /// Detect the capabilities of `extension` and wire each one.
    ///
    /// Returns the detected set.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingHostService` before any setter runs if a
    /// required service is not configured, and `Error::Extension` if a
    /// setter fails.
    pub fn inject(&self, extension: &mut dyn Extension) -> Result<CapabilitySet> {
        let capabilities = CapabilitySet::detect(&mut *extension);

        for service in capabilities.required_services() {
            if !self.services.is_configured(service) {
                return Err(Error::MissingHostService {
                    extension: extension.name().to_string(),
                    service,
                });
            }
        }

        for capability in capabilities.iter() {
            debug!(
                extension = %extension.name(),
                %capability,
                "Wiring capability"
            );
            self.wire(extension, capability)?;
        }

        Ok(capabilities)
    }

    fn wire(&self, extension: &mut dyn Extension, capability: Capability) -> Result<()> {
        let name = extension.name().to_string();
        match capability {
            Capability::DeploymentServiceAware => {
                let service = self.deployment(&name)?;
                if let Some(target) = extension.as_deployment_service_aware() {
                    target.set_deployment_service(service)?;
                }
            }
            Capability::RepositoryServiceAware => {
                let service = self.require(&name, HostService::Repository, &self.services.repository)?;
                if let Some(target) = extension.as_repository_service_aware() {
                    target.set_repository_service(service)?;
                }
            }
            Capability::ToolingServiceAware => {
                let service = self.require(&name, HostService::Tooling, &self.services.tooling)?;
                if let Some(target) = extension.as_tooling_service_aware() {
                    target.set_tooling_service(service)?;
                }
            }
            Capability::ArtifactClassLoaderManagerAware => {
                let manager = self.require(
                    &name,
                    HostService::ArtifactClassLoaderManager,
                    &self.services.class_loader_manager,
                )?;
                if let Some(target) = extension.as_artifact_class_loader_manager_aware() {
                    target.set_artifact_class_loader_manager(manager)?;
                }
            }
            Capability::CoreExtensionsAware => {
                if let Some(target) = extension.as_core_extensions_aware() {
                    target.set_core_extensions(Arc::clone(&self.core_extensions))?;
                }
            }
            Capability::ArtifactDeploymentListener => {
                let service = self.deployment(&name)?;
                if let Some(listener) = extension.artifact_deployment_listener() {
                    for category in ArtifactCategory::ALL {
                        service.add_deployment_listener_for(
                            DeploymentListenerAdapter::adapt(Arc::clone(&listener), category),
                            category,
                        );
                    }
                }
            }
            Capability::DeploymentListener => {
                let service = self.deployment(&name)?;
                if let Some(listener) = extension.deployment_listener() {
                    service.add_deployment_listener(listener);
                }
            }
        }
        Ok(())
    }

    fn deployment(&self, extension: &str) -> Result<Arc<dyn DeploymentService>> {
        self.require(extension, HostService::Deployment, &self.services.deployment)
    }

    fn require<T: ?Sized>(
        &self,
        extension: &str,
        service: HostService,
        handle: &Option<Arc<T>>,
    ) -> Result<Arc<T>> {
        handle.clone().ok_or_else(|| Error::MissingHostService {
            extension: extension.to_string(),
            service,
        })
    }
}
