// Application state for HTTP handlers
use crate::application::detail_service::DetailService;
use crate::application::enrichment_service::EnrichmentService;
use crate::application::fleet_service::FleetService;
use crate::application::map_engine::MapEngine;
use crate::application::orchestrator::Orchestrator;
use crate::presentation::charts::ChartPanel;
use crate::presentation::scene::SceneHandle;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub fleet: Arc<FleetService>,
    pub detail: Arc<DetailService>,
    pub enrichment: Arc<EnrichmentService>,
    pub engine: Arc<Mutex<MapEngine>>,
    pub scene: SceneHandle,
    pub charts: Arc<ChartPanel>,
}
