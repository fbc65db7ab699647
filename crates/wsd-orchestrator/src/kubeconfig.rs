use std::path::{Path, PathBuf};

/// Pick the cluster credential file, or `None` for in-cluster configuration.
///
/// Resolution order: explicit configured path, then the environment-indicated
/// kubeconfig, then the per-user default. The first candidate that exists on
/// disk wins; with no usable file the CLIs fall back to in-cluster config.
pub fn resolve_kubeconfig(
    explicit: Option<&Path>,
    env_kubeconfig: Option<&Path>,
    home: Option<&Path>,
) -> Option<PathBuf> {
    let default = home.map(|h| h.join(".kube").join("config"));

    [
        explicit.map(Path::to_path_buf),
        env_kubeconfig.map(Path::to_path_buf),
        default,
    ]
    .into_iter()
    .flatten()
    .find(|candidate| candidate.exists())
}
