//! AQI Server - route exposure analysis and station forecasts over HTTP

use std::net::SocketAddr;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aqi_server::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("aqi_server=debug".parse()?))
        .init();

    tracing::info!("Starting AQI Server...");

    let config = Config::from_env();
    if config.google_api_key.is_empty() {
        tracing::warn!("GOOGLE_API_KEY is not set; upstream lookups will be rejected");
    }

    let port = config.server_port;
    let state = AppState::from_config(&config);
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
