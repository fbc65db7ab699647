use std::path::PathBuf;

/// Daemon configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub database_path: PathBuf,
    pub kubeconfig: Option<PathBuf>,
    pub helm_chart_path: PathBuf,
    pub log_level: String,
    pub version: String,
}

fn default_http_host() -> String {
    std::env::var("WORKSPACE_HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn default_http_port() -> u16 {
    std::env::var("WORKSPACE_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8888)
}

fn default_database_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    match std::env::var("WORKSPACE_DATABASE_PATH") {
        Ok(path) => expand_home(&path, &home),
        Err(_) => PathBuf::from(home)
            .join(".humanlayer")
            .join("workspace-daemon.db"),
    }
}

fn default_helm_chart_path() -> PathBuf {
    std::env::var("WORKSPACE_HELM_CHART_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./helm/hld-workspace"))
}

fn default_log_level() -> String {
    std::env::var("WORKSPACE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn default_version() -> String {
    std::env::var("WORKSPACE_VERSION").unwrap_or_else(|_| "dev".to_string())
}

fn expand_home(path: &str, home: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => PathBuf::from(home).join(rest),
        None => PathBuf::from(path),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            database_path: default_database_path(),
            kubeconfig: std::env::var("KUBECONFIG").ok().map(PathBuf::from),
            helm_chart_path: default_helm_chart_path(),
            log_level: default_log_level(),
            version: default_version(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
