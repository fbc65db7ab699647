use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use wsd_orchestrator::{ObservedStatus, Orchestrator};
use wsd_registry::{
    EventKind, NewEvent, Registry, RegistryError, Workspace, WorkspaceEvent, WorkspaceSecret,
    WorkspaceStatus,
};

use crate::error::{ControllerError, Result};
use crate::identity;

const DEFAULT_IMAGE: &str = "hld";
const DEFAULT_IMAGE_TAG: &str = "latest";
const DEFAULT_CPU_REQUEST: &str = "100m";
const DEFAULT_MEMORY_REQUEST: &str = "256Mi";
const DEFAULT_CPU_LIMIT: &str = "1";
const DEFAULT_MEMORY_LIMIT: &str = "1Gi";
const DEFAULT_DATA_SIZE: &str = "1Gi";
const DEFAULT_SRC_SIZE: &str = "5Gi";

const MAX_NAME_LEN: usize = 63;
const DEFAULT_EVENT_LIMIT: i64 = 50;

/// Request to declare a new workspace. Everything but the name is optional;
/// omitted fields take the controller's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub docker_image: Option<String>,
    pub docker_image_tag: Option<String>,
    pub cpu_request: Option<String>,
    pub memory_request: Option<String>,
    pub cpu_limit: Option<String>,
    pub memory_limit: Option<String>,
    pub data_size: Option<String>,
    pub src_size: Option<String>,
    pub git_user_name: Option<String>,
    pub git_user_email: Option<String>,
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

/// The only component that mutates durable state and the only one that
/// invokes the orchestrator port. One method per public operation.
#[derive(Clone)]
pub struct WorkspaceController {
    registry: Registry,
    orchestrator: Arc<dyn Orchestrator>,
}

impl WorkspaceController {
    pub fn new(registry: Registry, orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            registry,
            orchestrator,
        }
    }

    /// Declare, persist, and deploy a new workspace.
    ///
    /// The declaration and its secrets are durable before the cluster is
    /// touched; a deploy failure leaves the workspace in `error` with an
    /// audit trail rather than rolling anything back.
    pub async fn create(&self, req: CreateWorkspaceRequest) -> Result<Workspace> {
        validate(&req)?;

        let mut ws = self.persist_declaration(&req).await?;
        info!(id = %ws.id, name = %ws.name, "workspace declared");

        let mut secrets = Vec::with_capacity(req.secrets.len());
        for (key, value) in &req.secrets {
            let secret = WorkspaceSecret {
                workspace_id: ws.id.clone(),
                key: key.clone(),
                value: value.clone(),
            };
            // A failed secret write does not abort the create; the deploy may
            // still succeed with the subset that was stored.
            if let Err(e) = self.registry.set_secret(&secret).await {
                error!(key = %key, error = %e, "failed to store secret");
            }
            secrets.push(secret);
        }

        self.registry
            .log_event(NewEvent {
                workspace_id: &ws.id,
                kind: EventKind::Created,
                message: &format!("Workspace {} created", ws.name),
                metadata: None,
            })
            .await
            .ok();

        match self.orchestrator.deploy(&ws, &secrets).await {
            Ok(()) => {
                ws.status = WorkspaceStatus::Running;
                let ws = self.registry.update_workspace(&ws).await?;
                self.registry
                    .log_event(NewEvent {
                        workspace_id: &ws.id,
                        kind: EventKind::Deployed,
                        message: "Helm release installed",
                        metadata: None,
                    })
                    .await
                    .ok();
                Ok(ws)
            }
            Err(e) => {
                error!(id = %ws.id, error = %e, "failed to deploy workspace");
                ws.status = WorkspaceStatus::Error;
                if let Err(ue) = self.registry.update_workspace(&ws).await {
                    error!(id = %ws.id, error = %ue, "failed to record error status");
                }
                self.registry
                    .log_event(NewEvent {
                        workspace_id: &ws.id,
                        kind: EventKind::Error,
                        message: &format!("Deployment failed: {e}"),
                        metadata: None,
                    })
                    .await
                    .ok();
                Err(ControllerError::Deploy(e))
            }
        }
    }

    /// One workspace plus, best-effort, its live cluster view.
    pub async fn get(&self, id: &str) -> Result<(Workspace, Option<ObservedStatus>)> {
        let ws = self.load(id).await?;

        let observed = match self.orchestrator.status(&ws).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(id = %id, error = %e, "failed to get observed status");
                None
            }
        };

        Ok((ws, observed))
    }

    /// All declarations, newest-created first. No cluster fan-out; returning
    /// quickly matters more than observed-status freshness here.
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        Ok(self.registry.list_workspaces().await?)
    }

    /// Scale a workspace to one replica. Idempotent; permitted from `error`
    /// as a recovery path.
    pub async fn start(&self, id: &str) -> Result<Workspace> {
        let mut ws = self.load(id).await?;

        self.orchestrator.start(&ws).await?;

        ws.status = WorkspaceStatus::Running;
        let ws = self.registry.update_workspace(&ws).await?;
        self.registry
            .log_event(NewEvent {
                workspace_id: &ws.id,
                kind: EventKind::Started,
                message: "Workspace started",
                metadata: None,
            })
            .await
            .ok();

        Ok(ws)
    }

    /// Scale a workspace to zero replicas. Idempotent.
    pub async fn stop(&self, id: &str) -> Result<Workspace> {
        let mut ws = self.load(id).await?;

        self.orchestrator.stop(&ws).await?;

        ws.status = WorkspaceStatus::Stopped;
        let ws = self.registry.update_workspace(&ws).await?;
        self.registry
            .log_event(NewEvent {
                workspace_id: &ws.id,
                kind: EventKind::Stopped,
                message: "Workspace stopped",
                metadata: None,
            })
            .await
            .ok();

        Ok(ws)
    }

    /// Remove a workspace everywhere.
    ///
    /// The registry record must remain removable even when the cluster is
    /// unreachable, so an orchestrator failure here is logged and the local
    /// delete proceeds; the cascade takes secrets and events with it.
    pub async fn delete(&self, id: &str) -> Result<Workspace> {
        let ws = self.load(id).await?;

        if let Err(e) = self.orchestrator.delete(&ws).await {
            warn!(id = %id, error = %e, "failed to delete workspace from cluster, removing record anyway");
        }

        if let Err(e) = self.registry.delete_secrets(id).await {
            warn!(id = %id, error = %e, "failed to delete workspace secrets");
        }

        self.registry.delete_workspace(id).await?;
        info!(id = %id, "workspace deleted");

        Ok(ws)
    }

    /// Audit events for a workspace, newest first.
    pub async fn events(&self, id: &str, limit: Option<i64>) -> Result<Vec<WorkspaceEvent>> {
        self.load(id).await?;

        let limit = limit.unwrap_or(DEFAULT_EVENT_LIMIT);
        Ok(self.registry.get_events(id, limit).await?)
    }

    async fn load(&self, id: &str) -> Result<Workspace> {
        self.registry
            .get_workspace(id)
            .await?
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))
    }

    /// Persist the declaration with a fresh id, retrying once on the (near
    /// impossible) id collision before surfacing the failure.
    async fn persist_declaration(&self, req: &CreateWorkspaceRequest) -> Result<Workspace> {
        match self.registry.create_workspace(&declare(req)).await {
            Ok(ws) => Ok(ws),
            Err(RegistryError::AlreadyExists(id)) => {
                warn!(id = %id, "workspace id collision, retrying with a fresh id");
                Ok(self.registry.create_workspace(&declare(req)).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn validate(req: &CreateWorkspaceRequest) -> Result<()> {
    if req.name.is_empty() {
        return Err(ControllerError::Validation("name is required".to_string()));
    }
    if req.name.len() > MAX_NAME_LEN {
        return Err(ControllerError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Build the workspace declaration: assign identity, derive names, and fill
/// defaults for everything the request omitted.
fn declare(req: &CreateWorkspaceRequest) -> Workspace {
    let id = identity::generate_id();

    let git_user_name = req.git_user_name.clone().unwrap_or_default();
    let git_user_email = req.git_user_email.clone().unwrap_or_default();
    let git_enabled = (!git_user_name.is_empty() && !git_user_email.is_empty())
        || req.secrets.contains_key("gh_token");

    Workspace {
        name: req.name.clone(),
        status: WorkspaceStatus::Pending,
        docker_image: or_default(req.docker_image.as_ref(), DEFAULT_IMAGE),
        docker_image_tag: or_default(req.docker_image_tag.as_ref(), DEFAULT_IMAGE_TAG),
        helm_release_name: identity::release_name(&id),
        namespace: identity::namespace(&id),
        ingress_host: identity::ingress_host(&id),
        cpu_request: or_default(req.cpu_request.as_ref(), DEFAULT_CPU_REQUEST),
        memory_request: or_default(req.memory_request.as_ref(), DEFAULT_MEMORY_REQUEST),
        cpu_limit: or_default(req.cpu_limit.as_ref(), DEFAULT_CPU_LIMIT),
        memory_limit: or_default(req.memory_limit.as_ref(), DEFAULT_MEMORY_LIMIT),
        data_size: or_default(req.data_size.as_ref(), DEFAULT_DATA_SIZE),
        src_size: or_default(req.src_size.as_ref(), DEFAULT_SRC_SIZE),
        git_enabled,
        git_user_name,
        git_user_email,
        created_at: chrono::DateTime::UNIX_EPOCH,
        updated_at: chrono::DateTime::UNIX_EPOCH,
        id,
    }
}

fn or_default(value: Option<&String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_fills_defaults_and_derived_names() {
        let ws = declare(&CreateWorkspaceRequest {
            name: "demo".to_string(),
            ..Default::default()
        });

        assert_eq!(ws.status, WorkspaceStatus::Pending);
        assert_eq!(ws.docker_image, "hld");
        assert_eq!(ws.docker_image_tag, "latest");
        assert_eq!(ws.helm_release_name, format!("hld-{}", ws.id));
        assert_eq!(ws.namespace, format!("workspace-{}", ws.id));
        assert_eq!(
            ws.ingress_host,
            format!("workspace-{}.workspaces.local", ws.id)
        );
        assert_eq!(ws.cpu_request, "100m");
        assert_eq!(ws.memory_limit, "1Gi");
        assert!(!ws.git_enabled);
    }

    #[test]
    fn git_enabled_by_committer_identity() {
        let ws = declare(&CreateWorkspaceRequest {
            name: "demo".to_string(),
            git_user_name: Some("dev".to_string()),
            git_user_email: Some("dev@example.com".to_string()),
            ..Default::default()
        });
        assert!(ws.git_enabled);

        // Name without email is not enough.
        let ws = declare(&CreateWorkspaceRequest {
            name: "demo".to_string(),
            git_user_name: Some("dev".to_string()),
            ..Default::default()
        });
        assert!(!ws.git_enabled);
    }

    #[test]
    fn git_enabled_by_token_secret() {
        let mut secrets = HashMap::new();
        secrets.insert("gh_token".to_string(), "ghp_x".to_string());

        let ws = declare(&CreateWorkspaceRequest {
            name: "demo".to_string(),
            secrets,
            ..Default::default()
        });
        assert!(ws.git_enabled);
    }

    #[test]
    fn empty_strings_fall_back_to_defaults() {
        let ws = declare(&CreateWorkspaceRequest {
            name: "demo".to_string(),
            docker_image: Some(String::new()),
            cpu_request: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(ws.docker_image, "hld");
        assert_eq!(ws.cpu_request, "100m");
    }

    #[test]
    fn name_validation_boundaries() {
        let ok = CreateWorkspaceRequest {
            name: "a".repeat(63),
            ..Default::default()
        };
        assert!(validate(&ok).is_ok());

        let too_long = CreateWorkspaceRequest {
            name: "a".repeat(64),
            ..Default::default()
        };
        assert!(matches!(
            validate(&too_long),
            Err(ControllerError::Validation(_))
        ));

        let empty = CreateWorkspaceRequest::default();
        assert!(matches!(
            validate(&empty),
            Err(ControllerError::Validation(_))
        ));
    }
}
