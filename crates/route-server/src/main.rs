//! Route Server - always-on backend for interactive route editing

use anyhow::Result;
use axum::routing::get;
use route_core::{FlatTerrain, GreatCircleAdapter};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use route_server::api;
use route_server::config::Config;
use route_server::geometry::{AsyncGeometryAdapter, InProcessAdapter};
use route_server::loops;
use route_server::state::AppState;
use route_server::terrain::TerrainGeometryAdapter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("route_server=debug".parse()?)
                .add_directive("route_core=info".parse()?),
        )
        .init();

    tracing::info!("Starting Route Server...");

    let config = Config::from_env();
    let port = config.server_port;

    let adapter: Arc<dyn AsyncGeometryAdapter> = if config.elevation_provider_url.trim().is_empty()
    {
        tracing::warn!("No elevation provider configured, segments will be flat");
        Arc::new(InProcessAdapter::new(GreatCircleAdapter::from_config(
            FlatTerrain(0.0),
            &config.editor,
        )))
    } else {
        tracing::info!("Elevation provider: {}", config.elevation_provider_url);
        Arc::new(TerrainGeometryAdapter::new(
            reqwest::Client::new(),
            &config,
        ))
    };

    let state = Arc::new(AppState::new(adapter, config.clone()));

    tokio::spawn(loops::session_reaper_loop::run_session_reaper_loop(
        state.clone(),
        config,
    ));

    let app = api::routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
