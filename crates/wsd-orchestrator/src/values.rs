//! Chart values rendering.
//!
//! Deterministic and total: the same declaration and secret bundle always
//! produce the same values document. Unknown secret keys are stored in the
//! registry but never forwarded to the chart.

use serde_json::{json, Map, Value};

use wsd_registry::{Workspace, WorkspaceSecret};

/// Chart key for each recognized non-git secret.
fn chart_secret_name(key: &str) -> Option<&'static str> {
    match key {
        "humanlayer_api_key" => Some("humanlayerApiKey"),
        "anthropic_api_key" => Some("anthropicApiKey"),
        "openrouter_api_key" => Some("openrouterApiKey"),
        _ => None,
    }
}

/// Render a workspace declaration plus its secret bundle into the values
/// document for the packaged chart.
pub fn render_values(ws: &Workspace, secrets: &[WorkspaceSecret]) -> Value {
    let mut values = Map::new();

    values.insert(
        "workspace".to_string(),
        json!({ "id": ws.id, "name": ws.name }),
    );
    values.insert(
        "image".to_string(),
        json!({ "repository": ws.docker_image, "tag": ws.docker_image_tag }),
    );
    values.insert("state".to_string(), json!({ "running": true }));

    let mut requests = Map::new();
    if !ws.cpu_request.is_empty() {
        requests.insert("cpu".to_string(), json!(ws.cpu_request));
    }
    if !ws.memory_request.is_empty() {
        requests.insert("memory".to_string(), json!(ws.memory_request));
    }
    let mut limits = Map::new();
    if !ws.cpu_limit.is_empty() {
        limits.insert("cpu".to_string(), json!(ws.cpu_limit));
    }
    if !ws.memory_limit.is_empty() {
        limits.insert("memory".to_string(), json!(ws.memory_limit));
    }
    let mut resources = Map::new();
    if !requests.is_empty() {
        resources.insert("requests".to_string(), Value::Object(requests));
    }
    if !limits.is_empty() {
        resources.insert("limits".to_string(), Value::Object(limits));
    }
    if !resources.is_empty() {
        values.insert("resources".to_string(), Value::Object(resources));
    }

    let mut storage = Map::new();
    if !ws.data_size.is_empty() {
        storage.insert("dataSize".to_string(), json!(ws.data_size));
    }
    if !ws.src_size.is_empty() {
        storage.insert("srcSize".to_string(), json!(ws.src_size));
    }
    if !storage.is_empty() {
        values.insert("storage".to_string(), Value::Object(storage));
    }

    if ws.git_enabled {
        let mut git = Map::new();
        git.insert("enabled".to_string(), json!(true));
        git.insert("userName".to_string(), json!(ws.git_user_name));
        git.insert("userEmail".to_string(), json!(ws.git_user_email));
        if let Some(token) = secrets.iter().find(|s| s.key == "gh_token") {
            git.insert("ghToken".to_string(), json!(token.value));
        }
        values.insert("git".to_string(), Value::Object(git));
    }

    let mut rendered_secrets = Map::new();
    for secret in secrets {
        if let Some(name) = chart_secret_name(&secret.key) {
            rendered_secrets.insert(name.to_string(), json!(secret.value));
        }
    }
    if !rendered_secrets.is_empty() {
        values.insert("secrets".to_string(), Value::Object(rendered_secrets));
    }

    Value::Object(values)
}
