//! Shared test doubles for the corext workspace.
//!
//! This crate provides scriptable extensions and recording host services so
//! lifecycle tests do not each hand-roll their own fakes. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`journal`]: [`CallJournal`], a shared, ordered log of lifecycle calls
//! - [`extension`]: [`RecordingExtension`], configurable to fail in any phase
//!   and to expose any capability
//! - [`services`]: recording deployment service and stub host services
//! - [`discovery`]: discoverers over a fixed list, or that always fail

pub mod discovery;
pub mod extension;
pub mod journal;
pub mod services;

pub use discovery::{FailingDiscoverer, VecDiscoverer};
pub use extension::{Received, RecordingExtension, RecordingListener};
pub use journal::{Call, CallJournal, Phase};
pub use services::{
    RecordingDeploymentService, Registration, StubClassLoaderManager, StubRepository, StubTooling,
    full_services,
};
