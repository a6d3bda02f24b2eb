//! Lifecycle manager: drives every extension through discovery, ordering,
//! wiring, and the initialise/start/stop/dispose lifecycle.
//!
//! Startup is strict: the first failure in `initialise` or `start` aborts
//! the phase, and nothing is rolled back. Teardown is lenient: `stop` and
//! `dispose` call every extension regardless of earlier failures and return
//! the failures in a [`TeardownReport`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::capability::CapabilitySet;
use crate::dependency::{DependencyResolver, ExtensionOrder, TopologicalResolver};
use crate::discovery::ExtensionDiscoverer;
use crate::error::{Error, Result, TeardownError, TeardownPhase};
use crate::extension::{Extension, ExtensionInfo, ExtensionState};
use crate::injector::CapabilityInjector;
use crate::services::{
    ArtifactClassLoaderManager, DeploymentService, HostServices, RepositoryService, ToolingService,
};

/// Phase of the manager as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagerPhase {
    /// Constructed; `initialise` has not run.
    Created,
    Initialised,
    Started,
    Stopped,
    Disposed,
    /// `initialise` or `start` raised.
    Failed,
}

impl fmt::Display for ManagerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Initialised => write!(f, "initialised"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
            Self::Disposed => write!(f, "disposed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a `stop` or `dispose` pass.
#[derive(Debug)]
pub struct TeardownReport {
    phase: TeardownPhase,
    attempted: Vec<String>,
    errors: Vec<TeardownError>,
}

impl TeardownReport {
    fn new(phase: TeardownPhase) -> Self {
        Self {
            phase,
            attempted: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn phase(&self) -> TeardownPhase {
        self.phase
    }

    /// Extensions whose teardown callback was called, in call order.
    pub fn attempted(&self) -> &[String] {
        &self.attempted
    }

    pub fn errors(&self) -> &[TeardownError] {
        &self.errors
    }

    /// Whether every attempted callback succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Slot {
    extension: Box<dyn Extension>,
    state: ExtensionState,
    capabilities: CapabilitySet,
}

/// Owns the discovered extensions and drives their lifecycle.
///
/// Intended call sequence, once per process: configure host services,
/// then `initialise`, `start`, `stop`, `dispose`. `stop` and `dispose` are
/// safe to call after a failed `initialise` or `start`.
pub struct LifecycleManager {
    discoverer: Box<dyn ExtensionDiscoverer>,
    resolver: Box<dyn DependencyResolver>,
    services: HostServices,
    /// Discovered extensions, in discovery order.
    slots: Vec<Slot>,
    /// Activation order; set once by `initialise`.
    order: Option<ExtensionOrder>,
    phase: ManagerPhase,
    disposed: bool,
}

impl LifecycleManager {
    /// Create a manager that discovers with `discoverer` and orders with
    /// [`TopologicalResolver`].
    pub fn new(discoverer: impl ExtensionDiscoverer + 'static) -> Self {
        Self {
            discoverer: Box::new(discoverer),
            resolver: Box::new(TopologicalResolver),
            services: HostServices::default(),
            slots: Vec::new(),
            order: None,
            phase: ManagerPhase::Created,
            disposed: false,
        }
    }

    /// Replace the dependency resolver.
    pub fn with_resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the whole host service table.
    pub fn with_services(mut self, services: HostServices) -> Self {
        self.services = services;
        self
    }

    pub fn with_deployment_service(mut self, service: Arc<dyn DeploymentService>) -> Self {
        self.set_deployment_service(service);
        self
    }

    pub fn with_repository_service(mut self, service: Arc<dyn RepositoryService>) -> Self {
        self.set_repository_service(service);
        self
    }

    pub fn with_tooling_service(mut self, service: Arc<dyn ToolingService>) -> Self {
        self.set_tooling_service(service);
        self
    }

    pub fn with_artifact_class_loader_manager(
        mut self,
        manager: Arc<dyn ArtifactClassLoaderManager>,
    ) -> Self {
        self.set_artifact_class_loader_manager(manager);
        self
    }

    pub fn set_deployment_service(&mut self, service: Arc<dyn DeploymentService>) {
        self.services.deployment = Some(service);
    }

    pub fn set_repository_service(&mut self, service: Arc<dyn RepositoryService>) {
        self.services.repository = Some(service);
    }

    pub fn set_tooling_service(&mut self, service: Arc<dyn ToolingService>) {
        self.services.tooling = Some(service);
    }

    pub fn set_artifact_class_loader_manager(&mut self, manager: Arc<dyn ArtifactClassLoaderManager>) {
        self.services.class_loader_manager = Some(manager);
    }

    /// Discover, order, wire, and initialise every extension.
    ///
    /// # Errors
    ///
    /// Returns `Error::InitialisationFailure` wrapping the first failure from
    /// discovery, resolution, capability wiring, or an extension's own
    /// `initialise`. Extensions initialised before the failure stay
    /// initialised. Returns `Error::InvalidPhase` if called twice.
    pub fn initialise(&mut self) -> Result<()> {
        self.expect_phase(ManagerPhase::Created, "initialise")?;

        let discovered = match self.discoverer.discover() {
            Ok(discovered) => discovered,
            Err(e) => return Err(self.fail_initialise(None, e)),
        };
        self.slots = discovered
            .into_iter()
            .map(|extension| Slot {
                extension,
                state: ExtensionState::Discovered,
                capabilities: CapabilitySet::new(),
            })
            .collect();

        let infos: Vec<ExtensionInfo> = self
            .slots
            .iter()
            .map(|slot| ExtensionInfo::of(slot.extension.as_ref()))
            .collect();
        let order = match self
            .resolver
            .resolve(&infos)
            .and_then(|order| order.validate(&infos).map(|()| order))
        {
            Ok(order) => order,
            Err(e) => return Err(self.fail_initialise(None, e)),
        };
        for slot in &mut self.slots {
            slot.state = ExtensionState::Ordered;
        }

        info!(count = order.len(), "Initializing core extensions");

        let positions = order.positions().to_vec();
        let injector = CapabilityInjector::new(&self.services, order.to_core_extensions());
        self.order = Some(order);

        for pos in positions {
            let slot = &mut self.slots[pos];
            let name = slot.extension.name().to_string();

            let outcome = injector
                .inject(slot.extension.as_mut())
                .and_then(|capabilities| {
                    slot.capabilities = capabilities;
                    slot.extension.initialise().map_err(Error::from)
                });

            if let Err(e) = outcome {
                slot.state = ExtensionState::Failed;
                self.phase = ManagerPhase::Failed;
                error!(extension = %name, error = %e, "Core extension failed to initialise");
                return Err(Error::initialisation(Some(&name), e));
            }

            slot.state = ExtensionState::Initialised;
            info!(extension = %name, "Core extension initialised");
        }

        self.phase = ManagerPhase::Initialised;
        Ok(())
    }

    /// Start every extension in activation order.
    ///
    /// # Errors
    ///
    /// Returns `Error::StartFailure` for the first extension that fails;
    /// later extensions are not started and earlier ones keep running.
    /// Returns `Error::InvalidPhase` unless `initialise` has completed.
    pub fn start(&mut self) -> Result<()> {
        self.expect_phase(ManagerPhase::Initialised, "start")?;
        let Some(order) = &self.order else {
            return Err(Error::InvalidPhase {
                operation: "start",
                phase: self.phase,
            });
        };

        info!("Starting core extensions");
        for &pos in order.positions() {
            let slot = &mut self.slots[pos];
            if let Err(source) = slot.extension.start() {
                let extension = slot.extension.name().to_string();
                slot.state = ExtensionState::Failed;
                self.phase = ManagerPhase::Failed;
                error!(extension = %extension, error = %source, "Core extension failed to start");
                return Err(Error::StartFailure { extension, source });
            }
            slot.state = ExtensionState::Started;
            info!(extension = %slot.extension.name(), "Core extension started");
        }

        self.phase = ManagerPhase::Started;
        Ok(())
    }

    /// Stop every extension in reverse activation order.
    ///
    /// Every extension's `stop` is called once, even if an earlier one
    /// failed. Does nothing if no activation order was ever resolved.
    ///
    /// Only extensions that were started move to `Stopped`. An extension
    /// that never started still receives `stop` but keeps its state.
    pub fn stop(&mut self) -> TeardownReport {
        let mut report = TeardownReport::new(TeardownPhase::Stop);
        let Some(order) = &self.order else {
            return report;
        };
        if self.disposed {
            warn!("Ignoring stop on disposed core extensions");
            return report;
        }

        info!("Stopping core extensions");
        for pos in order.stop_order() {
            let slot = &mut self.slots[pos];
            let name = slot.extension.name().to_string();
            match slot.extension.stop() {
                Ok(()) => {
                    if slot.state == ExtensionState::Started {
                        slot.state = ExtensionState::Stopped;
                    }
                    info!(extension = %name, "Core extension stopped");
                }
                Err(source) => {
                    slot.state = ExtensionState::Failed;
                    warn!(extension = %name, error = %source, "Error stopping core extension");
                    report.errors.push(TeardownError {
                        extension: name.clone(),
                        phase: TeardownPhase::Stop,
                        source,
                    });
                }
            }
            report.attempted.push(name);
        }

        if self.phase != ManagerPhase::Failed {
            self.phase = ManagerPhase::Stopped;
        }
        report
    }

    /// Dispose every discovered extension in discovery order.
    ///
    /// Every extension's `dispose` is called once, even if an earlier one
    /// failed. A second call does nothing.
    pub fn dispose(&mut self) -> TeardownReport {
        let mut report = TeardownReport::new(TeardownPhase::Dispose);
        if self.disposed {
            return report;
        }
        self.disposed = true;

        info!("Disposing core extensions");
        for slot in &mut self.slots {
            let name = slot.extension.name().to_string();
            match slot.extension.dispose() {
                Ok(()) => {
                    slot.state = ExtensionState::Disposed;
                    info!(extension = %name, "Core extension disposed");
                }
                Err(source) => {
                    slot.state = ExtensionState::Failed;
                    error!(extension = %name, error = %source, "Error disposing core extension");
                    report.errors.push(TeardownError {
                        extension: name.clone(),
                        phase: TeardownPhase::Dispose,
                        source,
                    });
                }
            }
            report.attempted.push(name);
        }

        if self.phase != ManagerPhase::Failed {
            self.phase = ManagerPhase::Disposed;
        }
        report
    }

    pub fn phase(&self) -> ManagerPhase {
        self.phase
    }

    /// Current state of the named extension, if it was discovered.
    pub fn state_of(&self, name: &str) -> Option<ExtensionState> {
        self.slot(name).map(|slot| slot.state)
    }

    /// Capabilities wired into the named extension.
    pub fn capabilities_of(&self, name: &str) -> Option<&CapabilitySet> {
        self.slot(name).map(|slot| &slot.capabilities)
    }

    /// Extension names in activation order; empty until resolution succeeds.
    pub fn ordered_names(&self) -> Vec<&str> {
        self.order.as_ref().map(ExtensionOrder::names).unwrap_or_default()
    }

    pub fn order(&self) -> Option<&ExtensionOrder> {
        self.order.as_ref()
    }

    /// Number of discovered extensions.
    pub fn extension_count(&self) -> usize {
        self.slots.len()
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.extension.name() == name)
    }

    fn expect_phase(&self, expected: ManagerPhase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn fail_initialise(&mut self, extension: Option<&str>, source: Error) -> Error {
        self.phase = ManagerPhase::Failed;
        error!(error = %source, "Core extension initialisation failed");
        Error::initialisation(extension, source)
    }
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("discoverer", &self.discoverer)
            .field("resolver", &self.resolver)
            .field("phase", &self.phase)
            .field("extensions", &self.slots.len())
            .field("order", &self.ordered_names())
            .finish()
    }
}
