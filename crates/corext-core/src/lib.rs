//! Core extension lifecycle orchestration.
//!
//! This crate discovers a set of pluggable runtime extensions, orders them
//! by their declared dependencies, wires host services into each one
//! according to the capabilities it exposes, and drives the whole set
//! through initialise, start, stop, and dispose.
//!
//! - **Dependency resolution**: stable topological ordering with cycle and
//!   missing-dependency detection ([`dependency`])
//! - **Capability injection**: optional `*Aware` interfaces and deployment
//!   listeners ([`capability`], [`injector`], [`listener`])
//! - **Lifecycle management**: fail-fast startup, fault-isolated teardown
//!   ([`manager`])
//! - **Catalog discovery**: TOML-driven extension catalogs and factories
//!   ([`config`], [`discovery`])
//!
//! # Example
//!
//! ```
//! use corext_core::capability::Capabilities;
//! use corext_core::{
//!     CatalogDiscoverer, ExtensionEntry, Extension, ExtensionError, ExtensionResult,
//!     ExtensionsConfig, LifecycleManager,
//! };
//!
//! struct Heartbeat(String);
//!
//! impl Capabilities for Heartbeat {}
//!
//! impl Extension for Heartbeat {
//!     fn name(&self) -> &str { &self.0 }
//!     fn initialise(&mut self) -> ExtensionResult { Ok(()) }
//!     fn start(&mut self) -> ExtensionResult { Ok(()) }
//!     fn stop(&mut self) -> ExtensionResult { Ok(()) }
//!     fn dispose(&mut self) -> ExtensionResult { Ok(()) }
//! }
//!
//! let config = ExtensionsConfig::from_toml("[[extension]]\nname = \"heartbeat\"\n")?;
//! let discoverer = CatalogDiscoverer::new(config).with_factory(
//!     "heartbeat",
//!     |entry: &ExtensionEntry| -> Result<Box<dyn Extension>, ExtensionError> {
//!         Ok(Box::new(Heartbeat(entry.name.clone())))
//!     },
//! );
//!
//! let mut manager = LifecycleManager::new(discoverer);
//! manager.initialise()?;
//! manager.start()?;
//! assert!(manager.stop().is_clean());
//! assert!(manager.dispose().is_clean());
//! # Ok::<(), corext_core::Error>(())
//! ```

pub mod capability;
pub mod config;
pub mod dependency;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod injector;
pub mod listener;
pub mod manager;
pub mod services;

pub use capability::{Capabilities, Capability, CapabilitySet, CoreExtensions};
pub use config::{CATALOG_FILENAME, ExtensionEntry, ExtensionsConfig};
pub use dependency::{DependencyGraph, DependencyResolver, ExtensionOrder, TopologicalResolver};
pub use discovery::{CatalogDiscoverer, ExtensionDiscoverer, ExtensionFactory};
pub use error::{Error, ExtensionError, Result, TeardownError, TeardownPhase};
pub use extension::{Extension, ExtensionInfo, ExtensionResult, ExtensionState};
pub use injector::CapabilityInjector;
pub use listener::{
    ArtifactCategory, ArtifactDeploymentListener, DeploymentListener, DeploymentListenerAdapter,
};
pub use manager::{LifecycleManager, ManagerPhase, TeardownReport};
pub use services::{
    ArtifactClassLoaderManager, DeploymentService, HostService, HostServices, RepositoryService,
    ToolingService,
};
