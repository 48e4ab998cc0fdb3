use anyhow::Context;
use docqa::{api, config, logging, processing};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::init_config().context("Failed to load configuration")?;
    logging::init_tracing();
    tracing::debug!(
        gemini_base_url = %config.gemini_base_url,
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        completion_model = %config.completion_model,
        chunk_size = config.text_splitter_chunk_size,
        chunk_overlap = config.text_splitter_chunk_overlap,
        top_k = config.search_top_k,
        "Loaded configuration"
    );

    let service = processing::DocumentService::new().context("Failed to start document service")?;
    let app = api::create_router(Arc::new(service));

    let port = config.server_port;
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
