//! reservoir-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use reservoir_gateway::api;
use reservoir_gateway::app_state::AppState;
use reservoir_gateway::config::GatewayConfig;
use reservoir_gateway::domain::BroadcastHub;
use reservoir_gateway::persistence::{MemoryStore, PostgresStore, ReservoirStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        addr = %config.listen_addr,
        persistence = config.persistence_enabled,
        "starting reservoir-gateway"
    );

    if config.persistence_enabled {
        let store = PostgresStore::connect(&config).await?;
        store.ensure_schema().await?;
        serve(store, &config).await
    } else {
        tracing::warn!("persistence disabled, readings are kept in memory only");
        serve(MemoryStore::new(), &config).await
    }
}

async fn serve<S: ReservoirStore>(store: S, config: &GatewayConfig) -> anyhow::Result<()> {
    // Build application state
    let app_state = AppState::new(store, BroadcastHub::new());

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
