//! Ingestion gateway binary
//!
//! Run with: cargo run --bin docq-server

use docq::{config::GatewayConfig, server::GatewayServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docq=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var("DOCQ_CONFIG").unwrap_or_else(|_| "docq.toml".to_string());
    let config = GatewayConfig::load_or_default(&config_path)?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Max file size: {} bytes", config.ingest.max_file_size);
    tracing::info!("  - Preview length: {} chars", config.ingest.preview_max_chars);
    tracing::info!("  - Storage root: {}", config.storage.root_dir.display());
    tracing::info!("  - RAG service: {}", config.rag.base_url);

    // the gateway still serves uploads while the RAG side is down;
    // only /api/ask depends on it
    let rag = docq::rag::RagClient::new(&config.rag)?;
    match rag.health_check().await {
        Ok(true) => tracing::info!("RAG service is reachable"),
        _ => tracing::warn!("RAG service not reachable at {}", config.rag.base_url),
    }

    let server = GatewayServer::new(config)?;

    tracing::info!("API: http://{}", server.address());
    tracing::info!("Health: http://{}/health", server.address());

    server.start().await?;

    Ok(())
}
