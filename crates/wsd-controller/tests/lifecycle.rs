//! Lifecycle transitions end-to-end against an in-memory registry and the
//! mock orchestrator.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use wsd_controller::{ControllerError, CreateWorkspaceRequest, WorkspaceController};
use wsd_orchestrator::mock::MockOrchestrator;
use wsd_registry::WorkspaceStatus;

#[tokio::test]
async fn create_minimal_becomes_running() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;

    let ws = controller.create(common::named("demo")).await.unwrap();

    assert_eq!(ws.name, "demo");
    assert_eq!(ws.status, WorkspaceStatus::Running);
    assert_eq!(ws.helm_release_name, format!("hld-{}", ws.id));
    assert_eq!(ws.namespace, format!("workspace-{}", ws.id));

    let events = registry.get_events(&ws.id, 10).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type, "deployed");
    assert_eq!(events[1].event_type, "created");
}

#[tokio::test]
async fn create_rejects_invalid_names() {
    let (controller, registry, mock) = common::controller_with(MockOrchestrator::new()).await;

    let err = controller.create(common::named("")).await.unwrap_err();
    assert!(matches!(err, ControllerError::Validation(_)));

    let err = controller
        .create(common::named(&"x".repeat(64)))
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Validation(_)));

    // Nothing was written and the cluster was never touched.
    assert!(registry.list_workspaces().await.unwrap().is_empty());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn create_accepts_63_char_name() {
    let (controller, _, _) = common::controller_with(MockOrchestrator::new()).await;

    let ws = controller
        .create(common::named(&"x".repeat(63)))
        .await
        .unwrap();
    assert_eq!(ws.status, WorkspaceStatus::Running);
}

#[tokio::test]
async fn deploy_failure_marks_error_and_surfaces() {
    let (controller, registry, _) =
        common::controller_with(MockOrchestrator::new().fail_deploy("namespace already exists"))
            .await;

    let err = controller.create(common::named("boom")).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let all = registry.list_workspaces().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, WorkspaceStatus::Error);

    let events = registry.get_events(&all[0].id, 10).await.unwrap();
    assert_eq!(events[0].event_type, "error");
    assert!(events[0].message.contains("already exists"));
    assert_eq!(events[1].event_type, "created");
}

#[tokio::test]
async fn stop_then_start_roundtrip() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;
    let ws = controller.create(common::named("demo")).await.unwrap();

    let stopped = controller.stop(&ws.id).await.unwrap();
    assert_eq!(stopped.status, WorkspaceStatus::Stopped);

    let started = controller.start(&ws.id).await.unwrap();
    assert_eq!(started.status, WorkspaceStatus::Running);

    let events = registry.get_events(&ws.id, 10).await.unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(kinds, vec!["started", "stopped", "deployed", "created"]);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (controller, _, _) = common::controller_with(MockOrchestrator::new()).await;
    let ws = controller.create(common::named("demo")).await.unwrap();

    controller.stop(&ws.id).await.unwrap();
    let again = controller.stop(&ws.id).await.unwrap();
    assert_eq!(again.status, WorkspaceStatus::Stopped);
}

#[tokio::test]
async fn start_error_leaves_declared_status() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;
    let ws = controller.create(common::named("demo")).await.unwrap();
    controller.stop(&ws.id).await.unwrap();

    // Same registry, orchestrator now failing.
    let failing = WorkspaceController::new(
        registry.clone(),
        Arc::new(MockOrchestrator::new().fail_start("connection refused")),
    );
    failing.start(&ws.id).await.unwrap_err();

    let stored = registry.get_workspace(&ws.id).await.unwrap().unwrap();
    assert_eq!(stored.status, WorkspaceStatus::Stopped);
}

#[tokio::test]
async fn delete_swallows_cluster_failure_and_is_idempotent() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;
    let ws = controller.create(common::named("demo")).await.unwrap();

    let failing = WorkspaceController::new(
        registry.clone(),
        Arc::new(MockOrchestrator::new().fail_delete("connection refused")),
    );

    // Cluster error is swallowed; the registry record goes away regardless.
    failing.delete(&ws.id).await.unwrap();
    assert!(registry.get_workspace(&ws.id).await.unwrap().is_none());

    let err = failing.delete(&ws.id).await.unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_secrets_and_events() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;

    let mut secrets = HashMap::new();
    secrets.insert("gh_token".to_string(), "ghp_y".to_string());
    let ws = controller
        .create(CreateWorkspaceRequest {
            name: "demo".to_string(),
            secrets,
            ..Default::default()
        })
        .await
        .unwrap();

    controller.delete(&ws.id).await.unwrap();

    assert!(registry.get_workspace(&ws.id).await.unwrap().is_none());
    assert!(registry.get_secrets(&ws.id).await.unwrap().is_empty());
    assert!(registry.get_events(&ws.id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_id_makes_no_orchestrator_call() {
    let (controller, _, mock) = common::controller_with(MockOrchestrator::new()).await;

    assert!(matches!(
        controller.start("a1b2c3d4").await.unwrap_err(),
        ControllerError::NotFound(_)
    ));
    assert!(matches!(
        controller.stop("a1b2c3d4").await.unwrap_err(),
        ControllerError::NotFound(_)
    ));
    assert!(matches!(
        controller.delete("a1b2c3d4").await.unwrap_err(),
        ControllerError::NotFound(_)
    ));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn secrets_are_stored_but_never_logged() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;

    let mut secrets = HashMap::new();
    secrets.insert("humanlayer_api_key".to_string(), "hl_x".to_string());
    secrets.insert("gh_token".to_string(), "ghp_y".to_string());

    let ws = controller
        .create(CreateWorkspaceRequest {
            name: "s".to_string(),
            secrets,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(ws.git_enabled);
    assert_eq!(
        registry
            .get_secret(&ws.id, "humanlayer_api_key")
            .await
            .unwrap()
            .as_deref(),
        Some("hl_x")
    );

    for event in registry.get_events(&ws.id, 100).await.unwrap() {
        assert!(!event.message.contains("hl_x"));
        assert!(!event.message.contains("ghp_y"));
    }
}

#[tokio::test]
async fn get_attaches_observed_status_best_effort() {
    let (controller, registry, _) = common::controller_with(MockOrchestrator::new()).await;
    let ws = controller.create(common::named("demo")).await.unwrap();

    let (_, observed) = controller.get(&ws.id).await.unwrap();
    assert!(observed.is_some());

    // A status failure is advisory, never blocking.
    let failing = WorkspaceController::new(
        registry.clone(),
        Arc::new(MockOrchestrator::new().fail_status("connection refused")),
    );
    let (fetched, observed) = failing.get(&ws.id).await.unwrap();
    assert_eq!(fetched.id, ws.id);
    assert!(observed.is_none());
}

#[tokio::test]
async fn list_is_newest_first_without_cluster_calls() {
    let (controller, _, mock) = common::controller_with(MockOrchestrator::new()).await;
    controller.create(common::named("A")).await.unwrap();
    controller.create(common::named("B")).await.unwrap();

    let calls_after_create = mock.calls().len();
    let all = controller.list().await.unwrap();

    assert_eq!(all[0].name, "B");
    assert_eq!(all[1].name, "A");
    assert_eq!(mock.calls().len(), calls_after_create);
}

#[tokio::test]
async fn events_require_existing_workspace() {
    let (controller, _, _) = common::controller_with(MockOrchestrator::new()).await;

    assert!(matches!(
        controller.events("missing1", None).await.unwrap_err(),
        ControllerError::NotFound(_)
    ));
}
