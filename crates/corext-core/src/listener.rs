//! Deployment listeners and the per-category adapter.
//!
//! The host's deployment service notifies plain [`DeploymentListener`]s. An
//! extension that wants events for every artifact category implements
//! [`ArtifactDeploymentListener`] instead, which receives the category with
//! each callback. [`DeploymentListenerAdapter`] bridges the two: one adapter
//! is registered per category, and it tags every event it forwards with that
//! category.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The kind of artifact a deployment event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactCategory {
    /// A deployable application
    Application,
    /// A domain shared by several applications
    Domain,
}

impl ArtifactCategory {
    /// All categories, in registration order.
    pub const ALL: [ArtifactCategory; 2] = [ArtifactCategory::Application, ArtifactCategory::Domain];
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::Domain => write!(f, "domain"),
        }
    }
}

/// Receives deployment notifications for one category of artifact.
///
/// Every callback defaults to doing nothing.
pub trait DeploymentListener: Send + Sync {
    fn on_deployment_start(&self, _artifact: &str) {}
    fn on_deployment_success(&self, _artifact: &str) {}
    fn on_deployment_failure(&self, _artifact: &str, _cause: &str) {}
    fn on_undeployment_start(&self, _artifact: &str) {}
    fn on_undeployment_success(&self, _artifact: &str) {}
    fn on_undeployment_failure(&self, _artifact: &str, _cause: &str) {}
    fn on_artifact_created(&self, _artifact: &str) {}
    fn on_artifact_initialised(&self, _artifact: &str) {}
    fn on_artifact_started(&self, _artifact: &str) {}
    fn on_artifact_stopped(&self, _artifact: &str) {}
}

/// Receives deployment notifications for any artifact category.
///
/// Mirrors [`DeploymentListener`], with the category passed to each callback.
pub trait ArtifactDeploymentListener: Send + Sync {
    fn on_deployment_start(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_deployment_success(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_deployment_failure(&self, _category: ArtifactCategory, _artifact: &str, _cause: &str) {}
    fn on_undeployment_start(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_undeployment_success(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_undeployment_failure(&self, _category: ArtifactCategory, _artifact: &str, _cause: &str) {
    }
    fn on_artifact_created(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_artifact_initialised(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_artifact_started(&self, _category: ArtifactCategory, _artifact: &str) {}
    fn on_artifact_stopped(&self, _category: ArtifactCategory, _artifact: &str) {}
}

/// Adapts an [`ArtifactDeploymentListener`] to a [`DeploymentListener`] bound
/// to a single artifact category.
pub struct DeploymentListenerAdapter {
    inner: Arc<dyn ArtifactDeploymentListener>,
    category: ArtifactCategory,
}

impl DeploymentListenerAdapter {
    /// Bind `listener` to `category`.
    pub fn new(listener: Arc<dyn ArtifactDeploymentListener>, category: ArtifactCategory) -> Self {
        Self {
            inner: listener,
            category,
        }
    }

    /// Bind `listener` to `category` and return it as a generic listener.
    pub fn adapt(
        listener: Arc<dyn ArtifactDeploymentListener>,
        category: ArtifactCategory,
    ) -> Arc<dyn DeploymentListener> {
        Arc::new(Self::new(listener, category))
    }

    /// The category this adapter forwards.
    pub fn category(&self) -> ArtifactCategory {
        self.category
    }
}

impl fmt::Debug for DeploymentListenerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentListenerAdapter")
            .field("category", &self.category)
            .field("inner", &"<listener>")
            .finish()
    }
}

impl DeploymentListener for DeploymentListenerAdapter {
    fn on_deployment_start(&self, artifact: &str) {
        self.inner.on_deployment_start(self.category, artifact);
    }

    fn on_deployment_success(&self, artifact: &str) {
        self.inner.on_deployment_success(self.category, artifact);
    }

    fn on_deployment_failure(&self, artifact: &str, cause: &str) {
        self.inner.on_deployment_failure(self.category, artifact, cause);
    }

    fn on_undeployment_start(&self, artifact: &str) {
        self.inner.on_undeployment_start(self.category, artifact);
    }

    fn on_undeployment_success(&self, artifact: &str) {
        self.inner.on_undeployment_success(self.category, artifact);
    }

    fn on_undeployment_failure(&self, artifact: &str, cause: &str) {
        self.inner
            .on_undeployment_failure(self.category, artifact, cause);
    }

    fn on_artifact_created(&self, artifact: &str) {
        self.inner.on_artifact_created(self.category, artifact);
    }

    fn on_artifact_initialised(&self, artifact: &str) {
        self.inner.on_artifact_initialised(self.category, artifact);
    }

    fn on_artifact_started(&self, artifact: &str) {
        self.inner.on_artifact_started(self.category, artifact);
    }

    fn on_artifact_stopped(&self, artifact: &str) {
        self.inner.on_artifact_stopped(self.category, artifact);
    }
}
