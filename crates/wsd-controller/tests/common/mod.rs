//! Shared fixtures for controller tests.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use wsd_controller::{CreateWorkspaceRequest, WorkspaceController};
use wsd_orchestrator::mock::MockOrchestrator;
use wsd_registry::Registry;

/// In-memory database with the registry migrations applied.
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to create in-memory database");

    sqlx::migrate!("../wsd-registry/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Controller wired to a fresh registry and the given mock orchestrator.
pub async fn controller_with(
    mock: MockOrchestrator,
) -> (WorkspaceController, Registry, Arc<MockOrchestrator>) {
    let registry = Registry::new(create_test_pool().await);
    let mock = Arc::new(mock);
    let controller = WorkspaceController::new(registry.clone(), mock.clone());
    (controller, registry, mock)
}

pub fn named(name: &str) -> CreateWorkspaceRequest {
    CreateWorkspaceRequest {
        name: name.to_string(),
        ..Default::default()
    }
}
