use anyhow::Context;
use api::app;
use api::state::{AppState, store_from_config};
use db::roster::seed_if_empty;
use db::row_store::DynRowStore;
use std::net::SocketAddr;
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let store = store_from_config().await?;
    seed_roster(&store).await?;

    let app_state = AppState::new(store);
    let displays = app_state.displays().clone();
    let app = app(app_state);

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .context("invalid HOST/PORT")?;

    tracing::info!(
        "Starting {} on http://{} (backend = {}, window = {}s, strict = {})",
        config::project_name(),
        addr,
        config::store_backend(),
        config::window_seconds(),
        config::strict_tokens(),
    );
    if config::lecturer_key().trim().is_empty() {
        tracing::warn!("LECTURER_KEY is not set; lecturer routes are open");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    displays.stop_all();
    tracing::info!("server stopped");
    Ok(())
}

/// Imports `ROSTER_PATH` into an empty store.
async fn seed_roster(store: &DynRowStore) -> anyhow::Result<()> {
    let path = config::roster_path();
    if path.trim().is_empty() {
        return Ok(());
    }
    let csv = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read roster {path}"))?;
    if let Some(rows) = seed_if_empty(store.as_ref(), &csv).await? {
        tracing::info!(path = %path, rows, "roster seeded");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

fn init_logging(log_file: &str, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
