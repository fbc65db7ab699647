use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::Registry;

/// Declared lifecycle status of a workspace.
///
/// This is the durable, user-visible status; the live cluster view is a
/// separate projection attached only at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceStatus {
    Pending,
    Running,
    Stopped,
    Error,
}

impl WorkspaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceStatus::Pending => "pending",
            WorkspaceStatus::Running => "running",
            WorkspaceStatus::Stopped => "stopped",
            WorkspaceStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared tenant environment: one namespace, one release, its storage
/// and optional ingress.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub status: WorkspaceStatus,
    pub docker_image: String,
    pub docker_image_tag: String,
    pub helm_release_name: String,
    pub namespace: String,
    pub ingress_host: String,

    // Resource envelope, forwarded opaquely to the release engine.
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,
    pub data_size: String,
    pub src_size: String,

    pub git_enabled: bool,
    pub git_user_name: String,
    pub git_user_email: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registry {
    /// Insert a new workspace, stamping both timestamps.
    ///
    /// Fails with [`RegistryError::AlreadyExists`] when the id collides.
    pub async fn create_workspace(&self, ws: &Workspace) -> Result<Workspace> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO workspaces (
                id, name, status, docker_image, docker_image_tag, helm_release_name,
                namespace, ingress_host, cpu_request, memory_request, cpu_limit,
                memory_limit, data_size, src_size, git_enabled, git_user_name,
                git_user_email, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ws.id)
        .bind(&ws.name)
        .bind(ws.status)
        .bind(&ws.docker_image)
        .bind(&ws.docker_image_tag)
        .bind(&ws.helm_release_name)
        .bind(&ws.namespace)
        .bind(&ws.ingress_host)
        .bind(&ws.cpu_request)
        .bind(&ws.memory_request)
        .bind(&ws.cpu_limit)
        .bind(&ws.memory_limit)
        .bind(&ws.data_size)
        .bind(&ws.src_size)
        .bind(ws.git_enabled)
        .bind(&ws.git_user_name)
        .bind(&ws.git_user_email)
        .bind(now.timestamp())
        .bind(now.timestamp())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(RegistryError::AlreadyExists(ws.id.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let mut created = ws.clone();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    /// Get a single workspace by id, or `None` when absent.
    pub async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let row = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List all workspaces, newest-created first.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        let rows = sqlx::query_as::<_, WorkspaceRow>(
            "SELECT * FROM workspaces ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Replace the mutable fields of a workspace and bump `updated_at`.
    ///
    /// Id, release name, and namespace are immutable and never part of the
    /// SET clause.
    pub async fn update_workspace(&self, ws: &Workspace) -> Result<Workspace> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE workspaces SET
                name = ?, status = ?, docker_image = ?, docker_image_tag = ?,
                ingress_host = ?, cpu_request = ?, memory_request = ?,
                cpu_limit = ?, memory_limit = ?, data_size = ?, src_size = ?,
                git_enabled = ?, git_user_name = ?, git_user_email = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&ws.name)
        .bind(ws.status)
        .bind(&ws.docker_image)
        .bind(&ws.docker_image_tag)
        .bind(&ws.ingress_host)
        .bind(&ws.cpu_request)
        .bind(&ws.memory_request)
        .bind(&ws.cpu_limit)
        .bind(&ws.memory_limit)
        .bind(&ws.data_size)
        .bind(&ws.src_size)
        .bind(ws.git_enabled)
        .bind(&ws.git_user_name)
        .bind(&ws.git_user_email)
        .bind(now.timestamp())
        .bind(&ws.id)
        .execute(&self.pool)
        .await?;

        let mut updated = ws.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Delete a workspace; secrets and events go with it via cascade.
    ///
    /// Deleting a missing id is not an error.
    pub async fn delete_workspace(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// Internal row type for sqlx.
#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: String,
    name: String,
    status: WorkspaceStatus,
    docker_image: String,
    docker_image_tag: String,
    helm_release_name: String,
    namespace: String,
    ingress_host: String,
    cpu_request: String,
    memory_request: String,
    cpu_limit: String,
    memory_limit: String,
    data_size: String,
    src_size: String,
    git_enabled: bool,
    git_user_name: String,
    git_user_email: String,
    created_at: i64,
    updated_at: i64,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: row.status,
            docker_image: row.docker_image,
            docker_image_tag: row.docker_image_tag,
            helm_release_name: row.helm_release_name,
            namespace: row.namespace,
            ingress_host: row.ingress_host,
            cpu_request: row.cpu_request,
            memory_request: row.memory_request,
            cpu_limit: row.cpu_limit,
            memory_limit: row.memory_limit,
            data_size: row.data_size,
            src_size: row.src_size,
            git_enabled: row.git_enabled,
            git_user_name: row.git_user_name,
            git_user_email: row.git_user_email,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or(DateTime::UNIX_EPOCH),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}
