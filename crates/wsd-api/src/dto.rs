//! API representations and response envelopes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use wsd_orchestrator::ObservedStatus;
use wsd_registry::{Workspace, WorkspaceEvent};

/// Response envelope: exactly one of `data` and `error` is populated.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// Envelope for delete acknowledgements.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceDto {
    pub id: String,
    pub name: String,
    pub status: String,
    pub docker_image: String,
    pub docker_image_tag: String,
    pub helm_release_name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ingress_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cpu_request: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory_request: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cpu_limit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory_limit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data_size: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_size: String,
    pub git_enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_user_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub git_user_email: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub deployment_status: Option<ObservedStatus>,
}

impl WorkspaceDto {
    pub fn from_workspace(ws: Workspace) -> Self {
        Self {
            id: ws.id,
            name: ws.name,
            status: ws.status.to_string(),
            docker_image: ws.docker_image,
            docker_image_tag: ws.docker_image_tag,
            helm_release_name: ws.helm_release_name,
            namespace: ws.namespace,
            ingress_host: ws.ingress_host,
            cpu_request: ws.cpu_request,
            memory_request: ws.memory_request,
            cpu_limit: ws.cpu_limit,
            memory_limit: ws.memory_limit,
            data_size: ws.data_size,
            src_size: ws.src_size,
            git_enabled: ws.git_enabled,
            git_user_name: ws.git_user_name,
            git_user_email: ws.git_user_email,
            created_at: rfc3339(ws.created_at),
            updated_at: rfc3339(ws.updated_at),
            deployment_status: None,
        }
    }

    pub fn with_status(ws: Workspace, status: Option<ObservedStatus>) -> Self {
        let mut dto = Self::from_workspace(ws);
        dto.deployment_status = status;
        dto
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventDto {
    pub id: i64,
    pub workspace_id: String,
    pub event_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: String,
}

impl EventDto {
    pub fn from_event(event: WorkspaceEvent) -> Self {
        Self {
            id: event.id,
            workspace_id: event.workspace_id,
            event_type: event.event_type,
            message: event.message,
            metadata: event.metadata,
            created_at: rfc3339(event.created_at),
        }
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
