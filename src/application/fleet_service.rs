// Fleet state coordinator - owns the vehicle collection and refresh lifecycle
use crate::application::telemetry_provider::TelemetryProvider;
use crate::domain::vehicle::{FleetStats, Group, Vehicle};
use anyhow::Context;
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct FleetState {
    group: Option<Group>,
    vehicles: Vec<Vehicle>,
    loading: bool,
    last_refreshed: Option<String>,
}

/// Read-only view of the fleet for the presentation layer. Statistics are
/// recomputed from the collection at snapshot time.
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub group: Option<Group>,
    pub vehicles: Vec<Vehicle>,
    pub stats: FleetStats,
    pub loading: bool,
    pub last_refreshed: Option<String>,
}

pub struct FleetService {
    provider: Arc<dyn TelemetryProvider>,
    state: Mutex<FleetState>,
}

impl FleetService {
    pub fn new(provider: Arc<dyn TelemetryProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(FleetState::default()),
        }
    }

    /// Fetch groups and select the first one. An empty group list is a
    /// valid terminal state, not a failure: the fleet simply stays empty.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        let groups = self
            .provider
            .list_groups()
            .await
            .context("fetching vehicle groups")?;

        let Some(group) = groups.into_iter().next() else {
            tracing::warn!("no vehicle groups available, fleet stays empty");
            return Ok(());
        };

        tracing::debug!(group = %group.code, "selected first available group");
        self.state.lock().await.group = Some(group);
        self.refresh().await
    }

    /// Refresh the vehicle collection for the active group. On failure the
    /// previous collection is retained and the error surfaces to the
    /// caller; the loading flag clears either way.
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let group_code = {
            let mut state = self.state.lock().await;
            let Some(group) = &state.group else {
                return Ok(());
            };
            let code = group.code.clone();
            state.loading = true;
            code
        };

        let result = self.provider.list_vehicles(&group_code).await;

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(vehicles) => {
                tracing::debug!(count = vehicles.len(), "vehicle collection replaced");
                state.vehicles = vehicles;
                state.last_refreshed = Some(Local::now().format("%d/%m/%Y %H:%M:%S").to_string());
                Ok(())
            }
            // keep the previous collection on failure
            Err(e) => Err(e).context("refreshing vehicle list"),
        }
    }

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.state.lock().await.vehicles.clone()
    }

    pub async fn find(&self, code: &str) -> Option<Vehicle> {
        self.state
            .lock()
            .await
            .vehicles
            .iter()
            .find(|v| v.code == code)
            .cloned()
    }

    pub async fn snapshot(&self) -> FleetSnapshot {
        let state = self.state.lock().await;
        FleetSnapshot {
            group: state.group.clone(),
            vehicles: state.vehicles.clone(),
            stats: FleetStats::compute(&state.vehicles),
            loading: state.loading,
            last_refreshed: state.last_refreshed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eco::EcoEvent;
    use crate::domain::position::HistoryBatch;
    use crate::domain::trip::Trip;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubProvider {
        groups: Vec<Group>,
        vehicles: Vec<Vehicle>,
        fail_vehicles: AtomicBool,
    }

    impl StubProvider {
        fn new(groups: Vec<Group>, vehicles: Vec<Vehicle>) -> Self {
            Self {
                groups,
                vehicles,
                fail_vehicles: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl TelemetryProvider for StubProvider {
        async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
            Ok(self.groups.clone())
        }

        async fn list_vehicles(&self, _group_code: &str) -> anyhow::Result<Vec<Vehicle>> {
            if self.fail_vehicles.load(Ordering::SeqCst) {
                anyhow::bail!("upstream unavailable");
            }
            Ok(self.vehicles.clone())
        }

        async fn get_history(
            &self,
            _vehicle_code: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<Vec<HistoryBatch>> {
            Ok(Vec::new())
        }

        async fn get_trips(
            &self,
            _vehicle_code: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<Vec<Trip>> {
            Ok(Vec::new())
        }

        async fn get_eco_events(
            &self,
            _vehicle_code: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<Vec<EcoEvent>> {
            Ok(Vec::new())
        }
    }

    fn group(code: &str) -> Group {
        Group {
            code: code.to_string(),
            name: code.to_string(),
        }
    }

    fn vehicle(code: &str, speed: f64) -> Vehicle {
        Vehicle {
            code: code.to_string(),
            name: code.to_string(),
            plate: String::new(),
            speed,
            last_position: None,
            last_position_at: None,
            odometer_m: 0.0,
            battery_percent: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_with_no_groups_leaves_fleet_empty() {
        let provider = Arc::new(StubProvider::new(Vec::new(), vec![vehicle("V1", 10.0)]));
        let service = FleetService::new(provider);

        service.bootstrap().await.unwrap();

        let snapshot = service.snapshot().await;
        assert!(snapshot.group.is_none());
        assert!(snapshot.vehicles.is_empty());
        assert!(snapshot.last_refreshed.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_selects_first_group_and_refreshes() {
        let provider = Arc::new(StubProvider::new(
            vec![group("G1"), group("G2")],
            vec![vehicle("V1", 0.0), vehicle("V2", 45.0)],
        ));
        let service = FleetService::new(provider);

        service.bootstrap().await.unwrap();

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.group.unwrap().code, "G1");
        assert_eq!(snapshot.vehicles.len(), 2);
        assert_eq!(snapshot.stats.moving, 1);
        assert_eq!(snapshot.stats.idle, 1);
        assert!(snapshot.last_refreshed.is_some());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_failed_refresh_retains_previous_collection() {
        let provider = Arc::new(StubProvider::new(
            vec![group("G1")],
            vec![vehicle("V1", 30.0)],
        ));
        let service = FleetService::new(provider.clone());
        service.bootstrap().await.unwrap();
        let stamp = service.snapshot().await.last_refreshed;

        provider.fail_vehicles.store(true, Ordering::SeqCst);
        let result = service.refresh().await;

        assert!(result.is_err());
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.vehicles.len(), 1);
        assert_eq!(snapshot.last_refreshed, stamp);
        assert!(!snapshot.loading);
    }
}
