// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::application::detail_service::DetailService;
use crate::application::enrichment_service::EnrichmentService;
use crate::application::fleet_service::FleetService;
use crate::application::map_engine::MapEngine;
use crate::application::orchestrator::Orchestrator;
use crate::infrastructure::config::load_fleet_config;
use crate::infrastructure::geocode_client::GeocodeClient;
use crate::infrastructure::telemetry_client::TelemetryClient;
use crate::infrastructure::weather_client::WeatherClient;
use crate::presentation::app_state::AppState;
use crate::presentation::charts::ChartPanel;
use crate::presentation::handlers::{
    close_scene, get_chart, get_detail, get_fleet, get_scene, health_check, inspect_trip,
    refresh_fleet, reload, select_vehicle, set_map_mode, set_range, switch_tab,
};
use crate::presentation::scene::SceneHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_fleet_config()?;

    // Create provider clients (infrastructure layer)
    let telemetry = Arc::new(TelemetryClient::new(
        config.telemetry.base_url.clone(),
        config.telemetry.api_key.clone(),
    )?);
    let weather = Arc::new(WeatherClient::new(config.weather.base_url.clone())?);
    let geocode = Arc::new(GeocodeClient::new(
        config.geocoding.base_url.clone(),
        config.geocoding.locale.clone(),
    )?);

    // Create coordinators (application layer)
    let fleet = Arc::new(FleetService::new(telemetry.clone()));
    let detail = Arc::new(DetailService::new(telemetry));
    let enrichment = Arc::new(EnrichmentService::new(weather, geocode));
    let engine = Arc::new(Mutex::new(MapEngine::new()));
    let charts = Arc::new(ChartPanel::new());
    let scene = SceneHandle::default();

    let orchestrator = Arc::new(Orchestrator::new(
        fleet.clone(),
        detail.clone(),
        enrichment.clone(),
        engine.clone(),
        charts.clone(),
    ));

    // Initial load; an unreachable provider is not fatal, the refresh
    // loop below keeps trying
    if let Err(e) = orchestrator.bootstrap().await {
        tracing::warn!("initial fleet load failed: {e:#}");
    }

    // Periodic fleet refresh
    {
        let orchestrator = orchestrator.clone();
        let period = Duration::from_secs(config.telemetry.refresh_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick fires immediately and bootstrap already ran
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = orchestrator.refresh_fleet().await {
                    tracing::warn!("periodic fleet refresh failed: {e:#}");
                }
            }
        });
    }

    // Create application state
    let state = Arc::new(AppState {
        orchestrator,
        fleet,
        detail,
        enrichment,
        engine,
        scene,
        charts,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/fleet", get(get_fleet))
        .route("/fleet/refresh", post(refresh_fleet))
        .route("/selection/:code", post(select_vehicle))
        .route("/map/mode/:mode", post(set_map_mode))
        .route("/map/scene", get(get_scene).delete(close_scene))
        .route("/map/trips/:index/pins", post(inspect_trip))
        .route("/detail", get(get_detail))
        .route("/detail/tab/:tab", post(switch_tab))
        .route("/detail/range", post(set_range))
        .route("/detail/reload", post(reload))
        .route("/charts/:target", get(get_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    println!("Starting fleet-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
