use crate::error::Result;
use crate::Registry;

/// A (workspace, key) → value triple.
///
/// The value is intentionally excluded from `Debug` output and the type
/// derives no serializer; secrets leave the registry only through the
/// orchestrator call path.
#[derive(Clone)]
pub struct WorkspaceSecret {
    pub workspace_id: String,
    pub key: String,
    pub value: String,
}

impl std::fmt::Debug for WorkspaceSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSecret")
            .field("workspace_id", &self.workspace_id)
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl Registry {
    /// Upsert a secret by (workspace_id, key).
    pub async fn set_secret(&self, secret: &WorkspaceSecret) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO workspace_secrets (workspace_id, key, value)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&secret.workspace_id)
        .bind(&secret.key)
        .bind(&secret.value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read one secret value. Absent keys are `None`, not an error, so
    /// callers can tell optional keys apart from failures.
    pub async fn get_secret(&self, workspace_id: &str, key: &str) -> Result<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as(
            "SELECT value FROM workspace_secrets WHERE workspace_id = ? AND key = ?",
        )
        .bind(workspace_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.map(|(v,)| v))
    }

    /// All secrets for a workspace.
    pub async fn get_secrets(&self, workspace_id: &str) -> Result<Vec<WorkspaceSecret>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT workspace_id, key, value FROM workspace_secrets WHERE workspace_id = ?",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(workspace_id, key, value)| WorkspaceSecret {
                workspace_id,
                key,
                value,
            })
            .collect())
    }

    /// Remove all secrets for a workspace.
    pub async fn delete_secrets(&self, workspace_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM workspace_secrets WHERE workspace_id = ?")
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
