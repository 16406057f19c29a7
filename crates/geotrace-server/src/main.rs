//! Geotrace Server - live telemetry scene for tracked vehicles and stations

use anyhow::Result;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geotrace_server::{api, config::Config, state, terrain};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("geotrace_server=debug".parse()?)
            .add_directive("geotrace_core=info".parse()?))
        .init();

    tracing::info!("Starting Geotrace Server...");

    let config = Config::from_env();
    let port = config.server_port;
    let resolver = terrain::build_resolver(&config).await?;
    let runtime = state::start(&config, resolver);

    let app = api::app(runtime.state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.engine_task.abort();
    runtime.prune_task.abort();
    tracing::info!("Geotrace Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
