use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wsd_api::{create_app, AppState, Config};
use wsd_controller::WorkspaceController;
use wsd_orchestrator::HelmOrchestrator;
use wsd_registry::db::{create_pool, run_migrations};
use wsd_registry::Registry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    let default_filter = match config.log_level.as_str() {
        "debug" => "debug,sqlx=info",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!(
        version = %config.version,
        host = %config.http_host,
        port = config.http_port,
        "starting workspace daemon"
    );

    let pool = create_pool(&config.database_path).await?;
    run_migrations(&pool).await?;
    info!(path = %config.database_path.display(), "database initialized");

    let registry = Registry::new(pool);
    let orchestrator = Arc::new(HelmOrchestrator::new(
        &config.helm_chart_path,
        config.kubeconfig.clone(),
    ));
    info!(chart_path = %config.helm_chart_path.display(), "orchestrator initialized");

    let controller = WorkspaceController::new(registry.clone(), orchestrator);
    let app = create_app(AppState::new(controller, config.version.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.close().await;
    info!("server stopped gracefully");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("received shutdown signal");
}
