//! Process wiring: provider, generator, router, listener.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::dialogue::{DialogueGenerator, DialogueRouteState, GeneratorConfig, dialogue_routes};
use crate::error::Result;
use crate::llm::{LlmProvider, create_provider};

/// Build the full application router around an already-constructed provider.
pub fn build_app(llm: Arc<dyn LlmProvider>, generator_config: GeneratorConfig) -> Router {
    let generator = Arc::new(DialogueGenerator::new(llm, generator_config));
    dialogue_routes(DialogueRouteState { generator })
}

/// Construct the provider from config and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let llm = create_provider(&config.llm)?;

    let generator_config = GeneratorConfig {
        timeout: config.generation_timeout,
        ..Default::default()
    };
    let app = build_app(llm, generator_config);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        port = config.port,
        backend = %config.llm.backend,
        model = %config.llm.model,
        timeout = ?config.generation_timeout,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
