use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("{program} failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("release operation already in progress: {0}; retry shortly")]
    Conflict(String),

    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    #[error("{op} timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// Classify a non-zero exit by its stderr.
    ///
    /// Helm reports an overlapping install/upgrade/rollback on the same
    /// release as "another operation is in progress"; an unreachable or
    /// misconfigured cluster surfaces as a connection failure.
    pub(crate) fn from_stderr(program: &str, stderr: &str) -> Self {
        let trimmed = stderr.trim();
        let lower = trimmed.to_lowercase();

        if lower.contains("another operation") && lower.contains("in progress") {
            return OrchestratorError::Conflict(trimmed.to_string());
        }
        if lower.contains("connection refused")
            || lower.contains("cluster unreachable")
            || lower.contains("unable to connect")
            || lower.contains("no such host")
        {
            return OrchestratorError::Unavailable(trimmed.to_string());
        }

        OrchestratorError::CommandFailed {
            program: program.to_string(),
            stderr: trimmed.to_string(),
        }
    }
}
