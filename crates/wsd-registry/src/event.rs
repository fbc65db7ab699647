use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::Registry;

/// Hard upper bound on a single event page. Larger limits are clamped.
pub const MAX_EVENT_LIMIT: i64 = 100;

/// Well-known event kinds emitted by the lifecycle controller.
///
/// Stored as plain text so readers tolerate kinds added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Deployed,
    Started,
    Stopped,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Deployed => "deployed",
            EventKind::Started => "started",
            EventKind::Stopped => "stopped",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only audit record. Never mutated; removed only by cascade.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceEvent {
    pub id: i64,
    pub workspace_id: String,
    pub event_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Registry::log_event`]; id and timestamp are assigned on append.
pub struct NewEvent<'a> {
    pub workspace_id: &'a str,
    pub kind: EventKind,
    pub message: &'a str,
    pub metadata: Option<&'a str>,
}

impl Registry {
    /// Append an event, assigning the next monotonic id and the current
    /// instant. Returns the completed record.
    pub async fn log_event(&self, event: NewEvent<'_>) -> Result<WorkspaceEvent> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO workspace_events (workspace_id, event_type, message, metadata, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.workspace_id)
        .bind(event.kind.as_str())
        .bind(event.message)
        .bind(event.metadata)
        .bind(now.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(WorkspaceEvent {
            id: result.last_insert_rowid(),
            workspace_id: event.workspace_id.to_string(),
            event_type: event.kind.as_str().to_string(),
            message: event.message.to_string(),
            metadata: event.metadata.map(str::to_string),
            created_at: now,
        })
    }

    /// Events for a workspace, newest first, bounded by `limit`
    /// (clamped to 1..=[`MAX_EVENT_LIMIT`]).
    pub async fn get_events(&self, workspace_id: &str, limit: i64) -> Result<Vec<WorkspaceEvent>> {
        let limit = limit.clamp(1, MAX_EVENT_LIMIT);

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, workspace_id, event_type, message, metadata, created_at
            FROM workspace_events WHERE workspace_id = ?
            ORDER BY id DESC LIMIT ?
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    workspace_id: String,
    event_type: String,
    message: String,
    metadata: Option<String>,
    created_at: i64,
}

impl From<EventRow> for WorkspaceEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            event_type: row.event_type,
            message: row.message,
            metadata: row.metadata,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}
