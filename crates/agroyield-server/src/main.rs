//! Server entry point: loads configuration and the model artifact, then
//! serves the prediction API.
//!
//! A model that fails to load is fatal; the process exits before binding
//! the listener.

use std::sync::Arc;

use agroyield_config::ServerConfig;
use agroyield_core::Pipeline;
use agroyield_server::{build_router, ServerState};
use anyhow::{Context, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env()?;
    let model_path = config.model_path.display().to_string();

    let pipeline = Pipeline::from_file(&config.model_path)
        .with_context(|| format!("Failed to load model at {model_path}"))?;
    info!(
        "Loaded model '{}' ({} trees) from {}",
        pipeline.name(),
        pipeline.num_trees(),
        model_path
    );
    info!("Expected features: {}", pipeline.feature_names().join(", "));

    let state = Arc::new(ServerState { pipeline, model_path });
    let app = build_router(state);

    let addr = config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
