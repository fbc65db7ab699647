//! Workspace lifecycle controller.
//!
//! Coordinates the durable registry and the orchestrator port for every
//! public operation: persist intent, invoke the cluster, reconcile stored
//! status with the outcome, and append audit events. This crate is consumed
//! by the HTTP surface but carries no HTTP concerns itself.

pub mod controller;
pub mod error;
pub mod identity;

pub use controller::{CreateWorkspaceRequest, WorkspaceController};
pub use error::{ControllerError, Result};
