//! Helm release-engine adapter.
//!
//! Translates workspace declarations into chart values, drives
//! install/upgrade/uninstall, and queries pods for liveness. One release per
//! workspace, named after it, in its own namespace.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use wsd_registry::{Workspace, WorkspaceSecret};

use crate::command::ClusterCommand;
use crate::error::{OrchestratorError, Result};
use crate::values::render_values;
use crate::{kubeconfig, ObservedPhase, ObservedStatus, Orchestrator};

const DEPLOY_TIMEOUT: &str = "5m";
const SCALE_TIMEOUT: &str = "2m";

const DEPLOY_DEADLINE: Duration = Duration::from_secs(5 * 60 + 30);
const SCALE_DEADLINE: Duration = Duration::from_secs(2 * 60 + 30);
const STATUS_DEADLINE: Duration = Duration::from_secs(5);

pub struct HelmOrchestrator {
    chart_path: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl HelmOrchestrator {
    /// Create an adapter for the packaged chart at `chart_path`.
    ///
    /// Cluster credentials resolve in order: `explicit_kubeconfig`,
    /// `$KUBECONFIG`, `~/.kube/config`, in-cluster.
    pub fn new(chart_path: impl Into<PathBuf>, explicit_kubeconfig: Option<PathBuf>) -> Self {
        let env_kubeconfig = std::env::var_os("KUBECONFIG").map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let kubeconfig = kubeconfig::resolve_kubeconfig(
            explicit_kubeconfig.as_deref(),
            env_kubeconfig.as_deref(),
            home.as_deref(),
        );

        match &kubeconfig {
            Some(path) => info!(path = %path.display(), "using kubeconfig"),
            None => info!("no kubeconfig found, assuming in-cluster configuration"),
        }

        Self {
            chart_path: chart_path.into(),
            kubeconfig,
        }
    }

    fn helm(&self, subcommand: &'static str) -> ClusterCommand {
        self.with_kubeconfig(ClusterCommand::helm(subcommand).arg(subcommand))
    }

    fn kubectl(&self, subcommand: &'static str) -> ClusterCommand {
        self.with_kubeconfig(ClusterCommand::kubectl(subcommand).arg(subcommand))
    }

    fn with_kubeconfig(&self, cmd: ClusterCommand) -> ClusterCommand {
        match &self.kubeconfig {
            Some(path) => cmd.arg("--kubeconfig").arg(path.display().to_string()),
            None => cmd,
        }
    }

    fn chart(&self) -> String {
        self.chart_path.display().to_string()
    }

    /// Flip `state.running` on the existing release, reusing its values.
    async fn set_running(&self, ws: &Workspace, running: bool) -> Result<()> {
        self.helm("upgrade")
            .arg(ws.helm_release_name.as_str())
            .arg(self.chart())
            .arg("--namespace")
            .arg(ws.namespace.as_str())
            .arg("--reuse-values")
            .arg("--set")
            .arg(format!("state.running={running}"))
            .arg("--wait=false")
            .arg("--timeout")
            .arg(SCALE_TIMEOUT)
            .timeout(SCALE_DEADLINE)
            .run()
            .await
    }
}

#[async_trait]
impl Orchestrator for HelmOrchestrator {
    async fn deploy(&self, ws: &Workspace, secrets: &[WorkspaceSecret]) -> Result<()> {
        info!(
            id = %ws.id,
            namespace = %ws.namespace,
            release = %ws.helm_release_name,
            "deploying workspace"
        );

        let values =
            serde_json::to_vec(&render_values(ws, secrets)).map_err(|source| {
                OrchestratorError::Parse {
                    what: "chart values",
                    source,
                }
            })?;

        // Values travel over stdin so secrets never show up in argv.
        self.helm("install")
            .arg(ws.helm_release_name.as_str())
            .arg(self.chart())
            .arg("--namespace")
            .arg(ws.namespace.as_str())
            .arg("--create-namespace")
            .arg("--wait=false")
            .arg("--timeout")
            .arg(DEPLOY_TIMEOUT)
            .arg("--values")
            .arg("-")
            .stdin(values)
            .timeout(DEPLOY_DEADLINE)
            .run()
            .await?;

        info!(id = %ws.id, "workspace deployed");
        Ok(())
    }

    async fn stop(&self, ws: &Workspace) -> Result<()> {
        info!(id = %ws.id, "stopping workspace");
        self.set_running(ws, false).await
    }

    async fn start(&self, ws: &Workspace) -> Result<()> {
        info!(id = %ws.id, "starting workspace");
        self.set_running(ws, true).await
    }

    async fn delete(&self, ws: &Workspace) -> Result<()> {
        info!(id = %ws.id, namespace = %ws.namespace, "deleting workspace");

        let uninstall = self
            .helm("uninstall")
            .arg(ws.helm_release_name.as_str())
            .arg("--namespace")
            .arg(ws.namespace.as_str())
            .arg("--wait")
            .arg("--timeout")
            .arg(SCALE_TIMEOUT)
            .timeout(SCALE_DEADLINE)
            .run()
            .await;

        match uninstall {
            Ok(()) => {}
            Err(OrchestratorError::CommandFailed { ref stderr, .. })
                if stderr.contains("not found") =>
            {
                info!(release = %ws.helm_release_name, "release already absent");
            }
            Err(e) => return Err(e),
        }

        // Helm does not delete namespaces it created. The controller retries
        // on the next delete call, so a failure here is only logged.
        let namespace_delete = self
            .kubectl("delete")
            .arg("namespace")
            .arg(ws.namespace.as_str())
            .arg("--ignore-not-found")
            .arg("--wait=false")
            .timeout(SCALE_DEADLINE)
            .run()
            .await;

        if let Err(e) = namespace_delete {
            warn!(namespace = %ws.namespace, error = %e, "failed to delete namespace");
        }

        info!(id = %ws.id, "workspace deleted");
        Ok(())
    }

    async fn status(&self, ws: &Workspace) -> Result<ObservedStatus> {
        let release_json = self
            .helm("status")
            .arg(ws.helm_release_name.as_str())
            .arg("--namespace")
            .arg(ws.namespace.as_str())
            .arg("--output")
            .arg("json")
            .timeout(STATUS_DEADLINE)
            .output()
            .await?;

        let release: HelmRelease =
            serde_json::from_str(&release_json).map_err(|source| OrchestratorError::Parse {
                what: "helm release status",
                source,
            })?;

        let pods_json = self
            .kubectl("get")
            .arg("pods")
            .arg("--namespace")
            .arg(ws.namespace.as_str())
            .arg("--selector")
            .arg(format!(
                "app.kubernetes.io/instance={}",
                ws.helm_release_name
            ))
            .arg("--output")
            .arg("json")
            .timeout(STATUS_DEADLINE)
            .output()
            .await?;

        let pods: PodList =
            serde_json::from_str(&pods_json).map_err(|source| OrchestratorError::Parse {
                what: "pod list",
                source,
            })?;

        Ok(observe(&release.info.status, &pods))
    }
}

/// Map a release-engine status string onto the observed phase vocabulary.
fn map_release_status(status: &str) -> ObservedPhase {
    match status {
        "deployed" => ObservedPhase::Running,
        "failed" => ObservedPhase::Error,
        "pending-install" | "pending-upgrade" | "pending-rollback" => ObservedPhase::Pending,
        "uninstalling" => ObservedPhase::Stopping,
        _ => ObservedPhase::Unknown,
    }
}

/// Combine the release phase with the matching pods into one projection.
fn observe(release_status: &str, pods: &PodList) -> ObservedStatus {
    let mut status = ObservedStatus {
        phase: map_release_status(release_status),
        ..ObservedStatus::unknown()
    };

    if pods.items.is_empty() {
        status.phase = ObservedPhase::Stopped;
        status.message = Some("No pods found".to_string());
        return status;
    }

    status.ready = pods.items.iter().any(|pod| {
        pod.status
            .conditions
            .iter()
            .any(|c| c.kind == "Ready" && c.status == "True")
    });

    let pod = &pods.items[0];
    status.pod_ip = pod.status.pod_ip.clone();
    status.node_name = pod.spec.node_name.clone();
    status.start_time = pod.status.start_time.clone();

    if let Some(condition) = pod.status.conditions.iter().find(|c| c.kind == "Ready") {
        if let Some(message) = condition.message.as_deref().filter(|m| !m.is_empty()) {
            status.message = Some(message.to_string());
        }
    }

    // Container waiting/terminated reasons carry the most actionable detail.
    for cs in &pod.status.container_statuses {
        if let Some(waiting) = &cs.state.waiting {
            if let Some(reason) = &waiting.reason {
                let detail = waiting.message.clone().unwrap_or_default();
                status.message = Some(format!("{reason}: {detail}"));
            }
        }
        if let Some(terminated) = &cs.state.terminated {
            if let Some(reason) = &terminated.reason {
                status.message = Some(format!("Terminated: {reason}"));
            }
        }
    }

    status
}

// Wire shapes for `helm status -o json` and `kubectl get pods -o json`.

#[derive(Deserialize)]
struct HelmRelease {
    info: HelmReleaseInfo,
}

#[derive(Deserialize)]
struct HelmReleaseInfo {
    status: String,
}

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Deserialize, Default)]
struct Pod {
    #[serde(default)]
    spec: PodSpec,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Deserialize, Default)]
struct PodSpec {
    #[serde(rename = "nodeName")]
    node_name: Option<String>,
}

#[derive(Deserialize, Default)]
struct PodStatus {
    #[serde(rename = "podIP")]
    pod_ip: Option<String>,
    #[serde(rename = "startTime")]
    start_time: Option<String>,
    #[serde(default)]
    conditions: Vec<PodCondition>,
    #[serde(rename = "containerStatuses", default)]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Deserialize)]
struct PodCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ContainerStatus {
    #[serde(default)]
    state: ContainerState,
}

#[derive(Deserialize, Default)]
struct ContainerState {
    waiting: Option<StateDetail>,
    terminated: Option<StateDetail>,
}

#[derive(Deserialize)]
struct StateDetail {
    reason: Option<String>,
    message: Option<String>,
}
