//! Vigía - incident and crime statistics dashboard for Santander, Colombia.
//!
//! # Overview
//!
//! Vigía aggregates crime and incident statistics from the Santander
//! security analytics API and serves render-ready dashboard views: stat
//! cards, trend and distribution charts, a map of incidents, the incident
//! table, and a small chat assistant.
//!
//! # API Endpoints
//!
//! - `GET /view/{tab}` - Render the view for a sidebar tab
//! - `GET /chat` - Current chat transcript
//! - `POST /chat/ask` - Ask the assistant a free-text question
//! - `POST /chat/quick/{kind}` - Ask one of the canned quick questions
//! - `GET /health` - Health check (includes upstream reachability)
//!
//! # Configuration
//!
//! - `VIGIA_PORT`: listen port (default 3000)
//! - `VIGIA_API_BASE`: base origin of the analytics API
//!   (default `http://localhost:8000`)

use std::env;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vigia::api::{AppState, build_router};
use vigia::client::{ApiClient, DEFAULT_API_BASE};

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vigia=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("VIGIA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let api_base = env::var("VIGIA_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

    info!(port, api_base = %api_base, "Starting Vigía dashboard");

    // One shared client: every view goes through the same data-access
    // layer, so overlapping fetches hit the response cache instead of the
    // upstream.
    let state = AppState::new(ApiClient::new(&api_base));

    let app = build_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Vigía is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
