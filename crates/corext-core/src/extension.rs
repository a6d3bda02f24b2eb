//! The extension contract and the per-extension state tracked by the manager.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::error::ExtensionError;

/// Outcome of an extension callback.
pub type ExtensionResult = std::result::Result<(), ExtensionError>;

/// A pluggable unit of runtime behaviour with its own lifecycle.
///
/// The manager calls the lifecycle methods in the fixed order
/// `initialise`, `start`, `stop`, `dispose`, each at most once per run.
/// Optional host services are offered through the [`Capabilities`]
/// supertrait; an extension that needs none can implement it with an empty
/// `impl` block.
pub trait Extension: Capabilities + Send {
    /// Unique name of this extension.
    fn name(&self) -> &str;

    /// Names of the extensions that must be initialised and started first.
    fn dependencies(&self) -> &[String] {
        &[]
    }

    fn initialise(&mut self) -> ExtensionResult;

    fn start(&mut self) -> ExtensionResult;

    fn stop(&mut self) -> ExtensionResult;

    fn dispose(&mut self) -> ExtensionResult;
}

impl fmt::Debug for dyn Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

/// Name and declared dependencies of an extension, detached from the
/// implementation.
///
/// This is the snapshot the dependency resolver works on, and the read-only
/// view handed to extensions that ask for the ordered extension list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ExtensionInfo {
    /// Describe an extension by name and dependency names.
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    /// Snapshot the identity of a live extension.
    pub fn of(extension: &dyn Extension) -> Self {
        Self {
            name: extension.name().to_string(),
            dependencies: extension.dependencies().to_vec(),
        }
    }
}

/// Lifecycle state of a single extension, as tracked by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionState {
    Discovered,
    Ordered,
    Initialised,
    Started,
    Stopped,
    Disposed,
    Failed,
}

impl fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered => write!(f, "discovered"),
            Self::Ordered => write!(f, "ordered"),
            Self::Initialised => write!(f, "initialised"),
            Self::Started => write!(f, "started"),
            Self::Stopped => write!(f, "stopped"),
            Self::Disposed => write!(f, "disposed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
