//! DocQA API Server
//!
//! Upload PDFs and ask questions about them over HTTP.

use anyhow::Context;
use docqa_api::{create_router, AppState};
use docqa_core::{AppConfig, LoggingConfig};
use docqa_rag::RagPipeline;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "docqa={level},docqa_api={level},docqa_rag={level},tower_http=info",
            level = logging.level
        ))
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.logging);
    config.validate().context("Invalid configuration")?;

    // Build the pipeline once; every request shares it
    let pipeline = RagPipeline::from_config(&config)
        .await
        .context("Failed to initialize pipeline")?;

    let addr = config.server.addr();
    let state = Arc::new(AppState::new(config, Arc::new(pipeline)));
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("DocQA API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
