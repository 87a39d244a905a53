// HTTP request handlers - thin facade over the coordination core
use crate::application::fleet_service::FleetSnapshot;
use crate::domain::chart::{ChartData, ChartTarget};
use crate::domain::eco::{average_event_speed, EcoSeverity};
use crate::domain::range::DateRange;
use crate::domain::selection::{DetailTab, MapMode, Selection};
use crate::domain::trip::Trip;
use crate::presentation::app_state::AppState;
use crate::presentation::scene::{MapScene, SceneSurface};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

type HandlerError = (StatusCode, String);

fn upstream_failure(err: anyhow::Error) -> HandlerError {
    tracing::error!("request failed: {err:#}");
    (StatusCode::BAD_GATEWAY, format!("{err:#}"))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current fleet snapshot with recomputed statistics.
pub async fn get_fleet(State(state): State<Arc<AppState>>) -> Json<FleetSnapshot> {
    Json(state.fleet.snapshot().await)
}

/// Manual fleet refresh.
pub async fn refresh_fleet(State(state): State<Arc<AppState>>) -> Result<StatusCode, HandlerError> {
    state
        .orchestrator
        .refresh_fleet()
        .await
        .map_err(upstream_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Select a vehicle, from a list row or a map marker alike.
pub async fn select_vehicle(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    if state.fleet.find(&code).await.is_none() {
        return Err((StatusCode::NOT_FOUND, format!("unknown vehicle {code}")));
    }
    // selecting mounts the trips panel, so its chart target comes up first
    state.charts.attach(ChartTarget::TripSpeed);
    state
        .orchestrator
        .select_vehicle(&code)
        .await
        .map_err(upstream_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle between live markers and the history trail.
pub async fn set_map_mode(
    Path(mode): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    let Some(mode) = MapMode::parse(&mode) else {
        return Err((StatusCode::BAD_REQUEST, format!("unknown map mode {mode}")));
    };
    state
        .orchestrator
        .set_mode(mode)
        .await
        .map_err(upstream_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch the detail tab. The tab's canvas mounts before the redraw so
/// the chart lands in an attached target.
pub async fn switch_tab(
    Path(tab): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    let Some(tab) = DetailTab::parse(&tab) else {
        return Err((StatusCode::BAD_REQUEST, format!("unknown tab {tab}")));
    };
    state.charts.attach(match tab {
        DetailTab::Trips => ChartTarget::TripSpeed,
        DetailTab::Eco => ChartTarget::EcoBreakdown,
    });
    state
        .orchestrator
        .switch_tab(tab)
        .await
        .map_err(upstream_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a new date range; fetching waits for the explicit reload.
pub async fn set_range(
    State(state): State<Arc<AppState>>,
    Json(range): Json<DateRange>,
) -> StatusCode {
    state.orchestrator.set_range(range).await;
    StatusCode::NO_CONTENT
}

/// Explicit reload of the active tab's dataset.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<StatusCode, HandlerError> {
    state
        .orchestrator
        .reload()
        .await
        .map_err(upstream_failure)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Overlay start/finish pins for one trip row.
pub async fn inspect_trip(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    state
        .orchestrator
        .inspect_trip(index)
        .await
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current map scene. The engine's surface is created lazily on the
/// first read, once this container view exists.
pub async fn get_scene(State(state): State<Arc<AppState>>) -> Json<MapScene> {
    {
        let mut engine = state.engine.lock().await;
        if !engine.is_attached() {
            engine.attach(Box::new(SceneSurface::new(&state.scene)));
        }
    }
    Json(state.scene.snapshot())
}

/// Tear the map surface down when the owning view is discarded.
pub async fn close_scene(State(state): State<Arc<AppState>>) -> StatusCode {
    state.engine.lock().await.detach();
    StatusCode::NO_CONTENT
}

/// Last drawn chart for a named render target.
pub async fn get_chart(
    Path(target): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartData>, HandlerError> {
    let Some(target) = ChartTarget::parse(&target) else {
        return Err((StatusCode::BAD_REQUEST, format!("unknown chart target {target}")));
    };
    state
        .charts
        .chart(target)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "no chart drawn".to_string()))
}

#[derive(Serialize)]
pub struct EcoEventRow {
    pub kind: &'static str,
    pub severity: EcoSeverity,
    pub at: DateTime<Utc>,
    pub speed_label: String,
}

#[derive(Serialize)]
pub struct WeatherView {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Everything the detail panel shows for the current selection.
#[derive(Serialize)]
pub struct DetailView {
    pub selection: Selection,
    pub range: DateRange,
    pub trips: Vec<Trip>,
    pub eco_events: Vec<EcoEventRow>,
    pub average_event_speed: Option<f64>,
    pub loading_trips: bool,
    pub loading_eco: bool,
    pub weather: Option<WeatherView>,
    pub loading_weather: bool,
    pub address: Option<String>,
}

pub async fn get_detail(State(state): State<Arc<AppState>>) -> Json<DetailView> {
    let selection = state.orchestrator.selection().await;
    let detail = state.detail.snapshot().await;
    let enrichment = state.enrichment.snapshot().await;

    let average = average_event_speed(&detail.eco_events);
    let eco_events = detail
        .eco_events
        .iter()
        .map(|event| EcoEventRow {
            kind: event.kind.label(),
            severity: event.severity,
            at: event.at,
            speed_label: event.speed_label(),
        })
        .collect();
    let weather = enrichment.weather.map(|w| WeatherView {
        temperature_c: w.temperature_c,
        wind_speed_kmh: w.wind_speed_kmh,
        label: w.condition.label(),
        icon: w.condition.icon(),
    });

    Json(DetailView {
        selection,
        range: detail.range,
        trips: detail.trips,
        eco_events,
        average_event_speed: average,
        loading_trips: detail.loading_trips,
        loading_eco: detail.loading_eco,
        weather,
        loading_weather: enrichment.loading_weather,
        address: enrichment.address.map(|a| a.label),
    })
}
