use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use entityscope_common::Config;
use entityscope_engine::{ClaudePersonaQuery, PersonaQuery};

mod rest;

pub struct AppState {
    pub client: Arc<dyn PersonaQuery>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = Config::from_env();

    let state = Arc::new(AppState {
        client: Arc::new(ClaudePersonaQuery::new(config.anthropic_api_key.clone())),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/analyze", post(rest::api_analyze))
        .with_state(state)
        // CORS: the analyzer form is served from anywhere
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("EntityScope API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
