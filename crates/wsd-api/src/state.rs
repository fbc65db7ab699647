use wsd_controller::WorkspaceController;

#[derive(Clone)]
pub struct AppState {
    pub controller: WorkspaceController,
    pub version: String,
}

impl AppState {
    pub fn new(controller: WorkspaceController, version: impl Into<String>) -> Self {
        Self {
            controller,
            version: version.into(),
        }
    }
}
