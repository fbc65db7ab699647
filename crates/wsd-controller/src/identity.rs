//! Identity assignment and derived naming.
//!
//! Each workspace gets a short opaque id at creation; its release name,
//! namespace, and default ingress host are functions of that id, computed
//! once and stored, never recomputed.

use uuid::Uuid;

pub const RELEASE_PREFIX: &str = "hld-";
pub const NAMESPACE_PREFIX: &str = "workspace-";
pub const INGRESS_SUFFIX: &str = ".workspaces.local";

/// 8 hex characters drawn from a v4 UUID: 32 bits of entropy, short enough
/// to read out loud.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub fn release_name(id: &str) -> String {
    format!("{RELEASE_PREFIX}{id}")
}

pub fn namespace(id: &str) -> String {
    format!("{NAMESPACE_PREFIX}{id}")
}

pub fn ingress_host(id: &str) -> String {
    format!("{NAMESPACE_PREFIX}{id}{INGRESS_SUFFIX}")
}
