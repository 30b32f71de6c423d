use std::sync::Arc;

use anyhow::Context;
use grading_orchestrator::{GraderConfig, Orchestrator};
use homework_grader_server::{AppState, ServerConfig, create_router, db};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_path = dotenvy::dotenv().ok();
    init_tracing()?;

    info!("starting homework grader server");
    if let Some(path) = dotenv_path {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = ServerConfig::from_env().context("failed to load server config")?;

    info!(path = %config.grader_config_path.display(), "loading grader config");
    let grader_config = GraderConfig::from_file(&config.grader_config_path).with_context(|| {
        format!(
            "failed to load grader config from {}",
            config.grader_config_path.display()
        )
    })?;

    let orchestrator =
        Arc::new(Orchestrator::new(grader_config).context("failed to initialize orchestrator")?);
    info!(producer = orchestrator.producer_name(), "grading producer ready");

    let db = db::init_pool_and_migrate(&config.database_url)
        .await
        .context("failed to initialize database")?;

    let mut event_stream = orchestrator.subscribe_events();
    tokio::spawn(async move {
        loop {
            match event_stream.recv().await {
                Ok(event) => debug!(?event, "grading event"),
                Err(err) => {
                    warn!(error = %err, "failed to receive grading event");
                    break;
                }
            }
        }
    });

    let state = Arc::new(AppState::new(orchestrator, db));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(bind_addr = %config.bind_addr, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
