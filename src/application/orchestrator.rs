// View orchestrator - sequences selection, mode, tab, and reload events
use crate::application::detail_service::DetailService;
use crate::application::enrichment_service::EnrichmentService;
use crate::application::fleet_service::FleetService;
use crate::application::map_engine::MapEngine;
use crate::application::render::ChartRenderer;
use crate::domain::chart::{eco_breakdown_chart, trip_speed_chart, ChartTarget};
use crate::domain::position::PositionSample;
use crate::domain::range::DateRange;
use crate::domain::selection::{DetailTab, MapMode, Selection};
use crate::domain::vehicle::Vehicle;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Top-level controller. Owns the selection and drives the coordinators,
/// the map engine, and the chart renderer so the three dependent views
/// never disagree about which vehicle they show.
pub struct Orchestrator {
    fleet: Arc<FleetService>,
    detail: Arc<DetailService>,
    enrichment: Arc<EnrichmentService>,
    engine: Arc<Mutex<MapEngine>>,
    charts: Arc<dyn ChartRenderer>,
    selection: Mutex<Selection>,
}

impl Orchestrator {
    pub fn new(
        fleet: Arc<FleetService>,
        detail: Arc<DetailService>,
        enrichment: Arc<EnrichmentService>,
        engine: Arc<Mutex<MapEngine>>,
        charts: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            fleet,
            detail,
            enrichment,
            engine,
            charts,
            selection: Mutex::new(Selection::default()),
        }
    }

    /// Initial load: fleet bootstrap, then live markers for everything.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        self.fleet.bootstrap().await?;
        let vehicles = self.fleet.vehicles().await;
        let mut engine = self.engine.lock().await;
        engine.update_markers(&vehicles);
        engine.fit_all(&vehicles);
        Ok(())
    }

    /// List clicks and marker clicks both land here. Resets every piece of
    /// per-vehicle state before the first fetch for the new vehicle goes
    /// out, then loads trips, draws the speed chart, and kicks enrichment
    /// off in the background.
    pub async fn select_vehicle(&self, code: &str) -> anyhow::Result<()> {
        let Some(vehicle) = self.fleet.find(code).await else {
            anyhow::bail!("unknown vehicle {code}");
        };
        tracing::debug!(vehicle = %vehicle.code, "vehicle selected");

        {
            let mut selection = self.selection.lock().await;
            selection.vehicle = Some(vehicle.clone());
            selection.mode = MapMode::Live;
            selection.tab = DetailTab::Trips;
        }
        {
            let mut engine = self.engine.lock().await;
            engine.clear_history();
            engine.pan_to(&vehicle);
        }

        // previous vehicle's data must be gone before any new fetch; the
        // returned tokens pin every fetch of this sequence to this selection
        let enrichment_generation = self.enrichment.reset().await;
        let detail_generation = self.detail.reset().await;

        self.detail.fetch_trips(detail_generation, &vehicle).await?;
        self.draw_chart(DetailTab::Trips).await;

        self.spawn_enrichment(enrichment_generation, &vehicle);
        Ok(())
    }

    /// Toggle between live markers and the one-vehicle history trail.
    /// Entering history without a selection is a state the UI prevents;
    /// when it happens anyway the engine is just returned to live.
    pub async fn set_mode(&self, mode: MapMode) -> anyhow::Result<()> {
        match mode {
            MapMode::History => {
                let vehicle = self.selection.lock().await.vehicle.clone();
                let Some(vehicle) = vehicle else {
                    tracing::warn!("history mode requested with no selection");
                    self.restore_live().await;
                    return Ok(());
                };
                let batches = self.detail.fetch_history(&vehicle).await?;
                let samples: Vec<PositionSample> =
                    batches.into_iter().flat_map(|b| b.positions).collect();
                self.engine.lock().await.draw_history(&samples);
                self.selection.lock().await.mode = MapMode::History;
            }
            MapMode::Live => self.restore_live().await,
        }
        Ok(())
    }

    /// Switch the detail tab, fetch its dataset, and redraw its chart.
    /// No-op without a selection.
    pub async fn switch_tab(&self, tab: DetailTab) -> anyhow::Result<()> {
        let vehicle = {
            let mut selection = self.selection.lock().await;
            selection.tab = tab;
            selection.vehicle.clone()
        };
        let Some(vehicle) = vehicle else {
            return Ok(());
        };

        let generation = self.detail.generation().await;
        match tab {
            DetailTab::Trips => self.detail.fetch_trips(generation, &vehicle).await?,
            DetailTab::Eco => self.detail.fetch_eco(generation, &vehicle).await?,
        }
        self.draw_chart(tab).await;
        Ok(())
    }

    /// Apply a new date range without refetching; the reload is explicit.
    pub async fn set_range(&self, range: DateRange) {
        self.detail.set_range(range).await;
    }

    /// Explicit date-range apply: refetch whichever dataset belongs to the
    /// active tab and redraw its chart.
    pub async fn reload(&self) -> anyhow::Result<()> {
        let (vehicle, tab) = {
            let selection = self.selection.lock().await;
            (selection.vehicle.clone(), selection.tab)
        };
        let Some(vehicle) = vehicle else {
            return Ok(());
        };

        let generation = self.detail.generation().await;
        match tab {
            DetailTab::Trips => self.detail.fetch_trips(generation, &vehicle).await?,
            DetailTab::Eco => self.detail.fetch_eco(generation, &vehicle).await?,
        }
        self.draw_chart(tab).await;
        Ok(())
    }

    /// Manual or periodic fleet refresh; live markers follow the new
    /// collection.
    pub async fn refresh_fleet(&self) -> anyhow::Result<()> {
        self.fleet.refresh().await?;
        let vehicles = self.fleet.vehicles().await;
        self.engine.lock().await.update_markers(&vehicles);
        Ok(())
    }

    /// Inspect one trip row: overlay its start/finish pins.
    pub async fn inspect_trip(&self, index: usize) -> anyhow::Result<()> {
        let trips = self.detail.trips().await;
        let Some(trip) = trips.get(index) else {
            anyhow::bail!("no trip at row {index}");
        };
        self.engine.lock().await.draw_trip_pins(trip);
        Ok(())
    }

    pub async fn selection(&self) -> Selection {
        self.selection.lock().await.clone()
    }

    async fn restore_live(&self) {
        let vehicles = self.fleet.vehicles().await;
        {
            let mut engine = self.engine.lock().await;
            engine.clear_history();
            engine.update_markers(&vehicles);
        }
        self.selection.lock().await.mode = MapMode::Live;
    }

    /// Redraw the chart belonging to a tab. The draw lands only when the
    /// named target's surface is attached; otherwise it is skipped and the
    /// next draw after the view mounts catches up.
    async fn draw_chart(&self, tab: DetailTab) {
        let (target, chart) = match tab {
            DetailTab::Trips => (
                ChartTarget::TripSpeed,
                trip_speed_chart(&self.detail.trips().await),
            ),
            DetailTab::Eco => (
                ChartTarget::EcoBreakdown,
                eco_breakdown_chart(&self.detail.eco_events().await),
            ),
        };
        if !self.charts.draw(target, chart) {
            tracing::debug!(target = target.id(), "chart target not attached, draw skipped");
        }
    }

    fn spawn_enrichment(&self, generation: u64, vehicle: &Vehicle) {
        let Some(position) = vehicle.last_position else {
            tracing::debug!(vehicle = %vehicle.code, "no position, skipping enrichment");
            return;
        };
        let enrichment = self.enrichment.clone();
        tokio::spawn(async move {
            futures::join!(
                enrichment.fetch_weather(generation, position.lat, position.lng),
                enrichment.fetch_address(generation, position.lat, position.lng),
            );
        });
    }
}
