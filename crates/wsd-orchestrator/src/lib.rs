//! Orchestrator port and its release-engine implementation.
//!
//! The lifecycle controller talks to the cluster exclusively through the
//! [`Orchestrator`] trait. [`helm::HelmOrchestrator`] implements it by
//! driving the packaged chart through the `helm` and `kubectl` CLIs; the
//! mock (behind the `test-helpers` feature) implements it in memory with
//! fault injection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use wsd_registry::{Workspace, WorkspaceSecret};

mod command;
pub mod error;
pub mod helm;
pub mod kubeconfig;
pub mod values;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use error::{OrchestratorError, Result};
pub use helm::HelmOrchestrator;

/// Phase of a workspace as observed on the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedPhase {
    Running,
    Stopped,
    Stopping,
    Pending,
    Error,
    Unknown,
}

/// Live cluster view of one workspace, computed at read time.
///
/// Advisory only: it is attached to responses and never written back to
/// the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedStatus {
    pub phase: ObservedPhase,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl ObservedStatus {
    pub fn unknown() -> Self {
        Self {
            phase: ObservedPhase::Unknown,
            ready: false,
            message: None,
            pod_ip: None,
            node_name: None,
            start_time: None,
        }
    }
}

/// Capability interface for materializing workspaces onto the cluster.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Materialize a new release in the workspace's namespace, creating the
    /// namespace if absent.
    async fn deploy(&self, ws: &Workspace, secrets: &[WorkspaceSecret]) -> Result<()>;

    /// Scale the existing release to zero replicas. Already-stopped is
    /// success.
    async fn stop(&self, ws: &Workspace) -> Result<()>;

    /// Scale the existing release back to one replica.
    async fn start(&self, ws: &Workspace) -> Result<()>;

    /// Uninstall the release and best-effort delete the namespace. Succeeds
    /// when the release is already absent, so double-delete is safe.
    async fn delete(&self, ws: &Workspace) -> Result<()>;

    /// Project the live cluster state of the workspace.
    async fn status(&self, ws: &Workspace) -> Result<ObservedStatus>;
}
