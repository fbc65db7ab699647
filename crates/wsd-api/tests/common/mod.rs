//! Shared helpers for API tests: in-memory database, mock orchestrator,
//! and a small client over `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use wsd_api::{create_app, AppState};
use wsd_controller::WorkspaceController;
use wsd_orchestrator::mock::MockOrchestrator;
use wsd_registry::Registry;

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

/// App wired to a fresh registry and the given mock orchestrator.
pub async fn test_app(mock: MockOrchestrator) -> (TestClient, Registry, Arc<MockOrchestrator>) {
    let registry = Registry::new(create_test_pool().await);
    let mock = Arc::new(mock);
    let controller = WorkspaceController::new(registry.clone(), mock.clone());
    let app = create_app(AppState::new(controller, "test"));

    (TestClient { app }, registry, mock)
}

pub struct TestClient {
    pub app: Router,
}

impl TestClient {
    pub async fn send_request(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send_request(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_request(request).await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send_request(request).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send_request(request).await
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8_lossy(&bytes).to_string()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}
