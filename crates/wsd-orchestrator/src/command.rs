//! Async command builder for the release-engine CLIs.
//!
//! Centralizes how `helm` and `kubectl` are invoked: captured output,
//! per-operation deadlines, stdin payloads for values (so secrets never
//! appear in argv), and stderr classification into typed errors.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{OrchestratorError, Result};

#[derive(Debug)]
pub(crate) struct ClusterCommand {
    program: &'static str,
    op: &'static str,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
}

impl ClusterCommand {
    pub fn helm(op: &'static str) -> Self {
        Self::new("helm", op)
    }

    pub fn kubectl(op: &'static str) -> Self {
        Self::new("kubectl", op)
    }

    fn new(program: &'static str, op: &'static str) -> Self {
        Self {
            program,
            op,
            args: Vec::new(),
            stdin: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed a payload over stdin instead of argv.
    pub fn stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute and return stdout on success.
    ///
    /// The child is killed when the future is dropped, so a disconnecting
    /// client aborts the cluster call along with the request.
    pub async fn output(self) -> Result<String> {
        debug!(program = self.program, op = self.op, args = ?self.args, "executing cluster command");

        let mut cmd = Command::new(self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| OrchestratorError::Spawn {
            program: self.program.to_string(),
            source,
        })?;

        if let Some(payload) = self.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&payload).await?;
                drop(stdin);
            }
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| OrchestratorError::Timeout {
                op: self.op,
                secs: self.timeout.as_secs(),
            })??;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(OrchestratorError::from_stderr(self.program, &stderr))
        }
    }

    /// Execute for effect only.
    pub async fn run(self) -> Result<()> {
        self.output().await.map(|_| ())
    }
}
