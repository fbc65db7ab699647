//! Durable registry for workspace declarations.
//!
//! This crate owns the persistent side of the daemon: workspace declarations,
//! their secrets, and an append-only event log, all backed by a single SQLite
//! database. It is consumed by the lifecycle controller, which is the only
//! writer; reads may happen concurrently from any request.

use sqlx::SqlitePool;

pub mod db;
pub mod error;
pub mod event;
pub mod secret;
pub mod workspace;

pub use error::{RegistryError, Result};
pub use event::{EventKind, NewEvent, WorkspaceEvent};
pub use secret::WorkspaceSecret;
pub use workspace::{Workspace, WorkspaceStatus};

/// Transactional store for workspaces, secrets, and events.
///
/// Cheap to clone; all clones share the same connection pool.
#[derive(Clone)]
pub struct Registry {
    pool: SqlitePool,
}

impl Registry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
