use thiserror::Error;

use wsd_orchestrator::OrchestratorError;
use wsd_registry::RegistryError;

pub type Result<T> = std::result::Result<T, ControllerError>;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("{0}")]
    Validation(String),

    #[error("workspace not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("deployment failed: {0}")]
    Deploy(#[source] OrchestratorError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}
