use utoipa::OpenApi;

use crate::dto::{EventDto, WorkspaceDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::workspaces::get_events,
    ),
    components(
        schemas(WorkspaceDto, EventDto)
    ),
    tags(
        (name = "workspace-daemon", description = "Workspace control-plane API")
    )
)]
pub struct ApiDoc;
