//! In-memory orchestrator for tests, with fault injection per operation.

use std::sync::Mutex;

use async_trait::async_trait;

use wsd_registry::{Workspace, WorkspaceSecret};

use crate::error::{OrchestratorError, Result};
use crate::{ObservedPhase, ObservedStatus, Orchestrator};

#[derive(Default)]
pub struct MockOrchestrator {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    deploy_error: Option<String>,
    stop_error: Option<String>,
    start_error: Option<String>,
    delete_error: Option<String>,
    status_error: Option<String>,
    observed: Option<ObservedStatus>,
    calls: Vec<String>,
}

impl MockOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deploy(self, message: &str) -> Self {
        self.inner.lock().unwrap().deploy_error = Some(message.to_string());
        self
    }

    pub fn fail_stop(self, message: &str) -> Self {
        self.inner.lock().unwrap().stop_error = Some(message.to_string());
        self
    }

    pub fn fail_start(self, message: &str) -> Self {
        self.inner.lock().unwrap().start_error = Some(message.to_string());
        self
    }

    pub fn fail_delete(self, message: &str) -> Self {
        self.inner.lock().unwrap().delete_error = Some(message.to_string());
        self
    }

    pub fn fail_status(self, message: &str) -> Self {
        self.inner.lock().unwrap().status_error = Some(message.to_string());
        self
    }

    pub fn with_observed(self, observed: ObservedStatus) -> Self {
        self.inner.lock().unwrap().observed = Some(observed);
        self
    }

    /// Every call made so far, as `"<op> <workspace id>"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn invoke(&self, op: &str, ws: &Workspace) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("{op} {}", ws.id));

        let injected = match op {
            "deploy" => &inner.deploy_error,
            "stop" => &inner.stop_error,
            "start" => &inner.start_error,
            "delete" => &inner.delete_error,
            "status" => &inner.status_error,
            _ => &None,
        };

        match injected {
            Some(message) => Err(OrchestratorError::CommandFailed {
                program: "helm".to_string(),
                stderr: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn deploy(&self, ws: &Workspace, _secrets: &[WorkspaceSecret]) -> Result<()> {
        self.invoke("deploy", ws)
    }

    async fn stop(&self, ws: &Workspace) -> Result<()> {
        self.invoke("stop", ws)
    }

    async fn start(&self, ws: &Workspace) -> Result<()> {
        self.invoke("start", ws)
    }

    async fn delete(&self, ws: &Workspace) -> Result<()> {
        self.invoke("delete", ws)
    }

    async fn status(&self, ws: &Workspace) -> Result<ObservedStatus> {
        self.invoke("status", ws)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.observed.clone().unwrap_or(ObservedStatus {
            phase: ObservedPhase::Running,
            ready: true,
            message: None,
            pod_ip: None,
            node_name: None,
            start_time: None,
        }))
    }
}
