//! Error types for corext-core

use std::path::PathBuf;

use crate::manager::ManagerPhase;
use crate::services::HostService;

/// Result type for corext-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error source carried by [`ExtensionError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by an extension callback or a discoverer.
///
/// Extensions are foreign code; this type lets them describe a failure with
/// a message and, optionally, the underlying error that caused it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ExtensionError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error with a message and an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while ordering, wiring, or driving extensions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two discovered extensions share a name
    #[error("Duplicate extension name: {name}")]
    DuplicateExtension { name: String },

    /// An extension depends on a name that was not discovered
    #[error("Extension '{extension}' depends on '{dependency}', which was not discovered")]
    UnresolvedDependency {
        extension: String,
        dependency: String,
    },

    /// The dependency graph contains a cycle
    #[error("Cyclic dependency between extensions: {}", .participants.join(" -> "))]
    CyclicDependency { participants: Vec<String> },

    /// An extension exposes a capability whose host service was never configured
    #[error("Extension '{extension}' requires the {service} but none was configured")]
    MissingHostService {
        extension: String,
        service: HostService,
    },

    /// A resolver returned an order that does not cover the discovered set exactly once
    #[error("Resolved order is invalid: {reason}")]
    InvalidOrder { reason: String },

    /// The discoverer failed to produce the extension set
    #[error("Extension discovery failed: {0}")]
    Discovery(#[source] ExtensionError),

    /// A lifecycle call was made in a phase that does not allow it
    #[error("Cannot {operation} while the manager is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: ManagerPhase,
    },

    /// The initialise phase aborted
    #[error(
        "Initialisation failed{}: {source}",
        .extension.as_deref().map(|name| format!(" for extension '{name}'")).unwrap_or_default()
    )]
    InitialisationFailure {
        /// The extension being wired or initialised, if the failure came from one
        extension: Option<String>,
        #[source]
        source: Box<Error>,
    },

    /// An extension failed to start
    #[error("Extension '{extension}' failed to start: {source}")]
    StartFailure {
        extension: String,
        #[source]
        source: ExtensionError,
    },

    /// An extension callback failed
    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// Extension configuration file not found
    #[error("Extension configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid extension name in configuration
    #[error("Invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Configuration names a kind that no factory was registered for
    #[error("No extension factory registered for kind '{kind}' (extension '{extension}')")]
    UnknownKind { extension: String, kind: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

/// Phase of a fault-isolated teardown pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownPhase {
    Stop,
    Dispose,
}

impl std::fmt::Display for TeardownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Dispose => write!(f, "dispose"),
        }
    }
}

/// A failure collected during `stop` or `dispose`.
///
/// Teardown errors are reported, never raised.
#[derive(Debug, thiserror::Error)]
#[error("Extension '{extension}' failed to {phase}: {source}")]
pub struct TeardownError {
    pub extension: String,
    pub phase: TeardownPhase,
    #[source]
    pub source: ExtensionError,
}

impl Error {
    /// Wrap an error raised during the initialise phase.
    pub(crate) fn initialisation(extension: Option<&str>, source: Error) -> Self {
        Self::InitialisationFailure {
            extension: extension.map(str::to_string),
            source: Box::new(source),
        }
    }

    /// The innermost `corext` error, unwrapping `InitialisationFailure` layers.
    pub fn root(&self) -> &Error {
        match self {
            Self::InitialisationFailure { source, .. } => source.root(),
            other => other,
        }
    }
}
