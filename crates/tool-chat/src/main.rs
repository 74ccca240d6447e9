//! Tool Chat - Entry point.

use anyhow::{Context, Result};
use llm_client::LlmClient;
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tool_chat::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    ChatOrchestrator, Config, LlmCompletionEngine,
};
use tools::{mcp::McpToolProvider, ProviderChain, ToolRegistryGateway};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tool Chat");

    let llm = LlmClient::new(
        config.llm.api_key.expose_secret().clone(),
        &config.llm.base_url,
        &config.llm.model,
        config.llm.timeout,
    )
    .context("Failed to create completion client")?;

    if llm.health_check().await {
        info!(model = %llm.model(), "Completion service reachable");
    } else {
        warn!("Completion service health check failed, continuing anyway");
    }

    let mut providers = ProviderChain::new();
    for (name, url) in config.mcp.servers()? {
        info!(server = %name, %url, "Registering MCP server");
        providers.push(Box::new(McpToolProvider::new(name, url)));
    }
    if providers.is_empty() {
        warn!("No MCP servers configured, chats will run without tools");
    }

    let gateway = Arc::new(
        ToolRegistryGateway::load(&providers)
            .await
            .context("Failed to load tools")?,
    );
    info!(tools = gateway.len(), "Tool registry ready");

    let engine = LlmCompletionEngine::new(Arc::new(llm))
        .with_max_tool_iterations(config.chat.max_tool_iterations)
        .with_tool_timeout(config.mcp.tool_timeout)
        .with_max_tool_response_len(config.mcp.max_response_len);

    let orchestrator = ChatOrchestrator::new(gateway.clone(), Arc::new(engine));
    let state = AppState::new(gateway, orchestrator, config.llm.model.as_str());

    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", config.server.listen_addr))?,
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
