pub mod health;
pub mod workspaces;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // Permissive CORS so the web UI can talk to the daemon from another port.
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(health::routes())
        .merge(workspaces::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
