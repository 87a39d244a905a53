// Vehicle detail coordinator - trips, eco-events, and the active date range
use crate::application::telemetry_provider::TelemetryProvider;
use crate::domain::eco::EcoEvent;
use crate::domain::position::HistoryBatch;
use crate::domain::range::DateRange;
use crate::domain::trip::Trip;
use crate::domain::vehicle::Vehicle;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

struct DetailState {
    /// Bumped on every selection change. Async results carry the value
    /// captured at dispatch and are discarded when it no longer matches.
    generation: u64,
    range: DateRange,
    trips: Vec<Trip>,
    eco_events: Vec<EcoEvent>,
    loading_trips: bool,
    loading_eco: bool,
}

impl Default for DetailState {
    fn default() -> Self {
        Self {
            generation: 0,
            range: DateRange::default(),
            trips: Vec::new(),
            eco_events: Vec::new(),
            loading_trips: false,
            loading_eco: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailSnapshot {
    pub range: DateRange,
    pub trips: Vec<Trip>,
    pub eco_events: Vec<EcoEvent>,
    pub loading_trips: bool,
    pub loading_eco: bool,
}

pub struct DetailService {
    provider: Arc<dyn TelemetryProvider>,
    state: Mutex<DetailState>,
}

impl DetailService {
    pub fn new(provider: Arc<dyn TelemetryProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(DetailState::default()),
        }
    }

    /// Clear all per-vehicle state ahead of a new selection and return the
    /// new generation. Runs before any fetch for the new vehicle is
    /// issued; every fetch presents the token, so in-flight work for an
    /// old selection can never land in the new view.
    pub async fn reset(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.trips.clear();
        state.eco_events.clear();
        state.loading_trips = false;
        state.loading_eco = false;
        state.generation
    }

    /// The generation of the current selection, for fetches that don't
    /// accompany a reset (tab switches, reloads).
    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    /// Apply a new date range. Deliberately does not refetch; the reload
    /// action is explicit so half-picked ranges don't trigger requests.
    pub async fn set_range(&self, range: DateRange) {
        self.state.lock().await.range = range;
    }

    pub async fn range(&self) -> DateRange {
        self.state.lock().await.range
    }

    pub async fn fetch_trips(&self, generation: u64, vehicle: &Vehicle) -> anyhow::Result<()> {
        let range = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                return Ok(());
            }
            state.trips.clear();
            state.loading_trips = true;
            state.range
        };

        let result = self
            .provider
            .get_trips(
                &vehicle.code,
                &range.window_start_iso(),
                &range.window_end_iso(),
            )
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(vehicle = %vehicle.code, "discarding trip response for a stale selection");
            return Ok(());
        }
        state.loading_trips = false;
        match result {
            Ok(trips) => {
                state.trips = trips;
                Ok(())
            }
            Err(e) => Err(e).context("fetching trips"),
        }
    }

    pub async fn fetch_eco(&self, generation: u64, vehicle: &Vehicle) -> anyhow::Result<()> {
        let range = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                return Ok(());
            }
            state.eco_events.clear();
            state.loading_eco = true;
            state.range
        };

        let result = self
            .provider
            .get_eco_events(
                &vehicle.code,
                &range.window_start_iso(),
                &range.window_end_iso(),
            )
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(vehicle = %vehicle.code, "discarding eco response for a stale selection");
            return Ok(());
        }
        state.loading_eco = false;
        match result {
            Ok(events) => {
                state.eco_events = events;
                Ok(())
            }
            Err(e) => Err(e).context("fetching eco events"),
        }
    }

    /// Position history for the active range. Returned to the caller raw;
    /// the map engine consumes it directly and no coordinator state is
    /// touched.
    pub async fn fetch_history(&self, vehicle: &Vehicle) -> anyhow::Result<Vec<HistoryBatch>> {
        let range = self.state.lock().await.range;
        self.provider
            .get_history(
                &vehicle.code,
                &range.window_start_iso(),
                &range.window_end_iso(),
            )
            .await
            .context("fetching position history")
    }

    pub async fn trips(&self) -> Vec<Trip> {
        self.state.lock().await.trips.clone()
    }

    pub async fn eco_events(&self) -> Vec<EcoEvent> {
        self.state.lock().await.eco_events.clone()
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        let state = self.state.lock().await;
        DetailSnapshot {
            range: state.range,
            trips: state.trips.clone(),
            eco_events: state.eco_events.clone(),
            loading_trips: state.loading_trips,
            loading_eco: state.loading_eco,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vehicle::Group;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn trip_tagged(tag: &str) -> Trip {
        Trip {
            start_position: None,
            finish_position: None,
            start_address: None,
            finish_address: None,
            distance_m: 0.0,
            average_speed: 50.0,
            max_speed: 60.0,
            duration_label: tag.to_string(),
            started_at: Utc::now(),
        }
    }

    fn vehicle(code: &str) -> Vehicle {
        Vehicle {
            code: code.to_string(),
            name: code.to_string(),
            plate: String::new(),
            speed: 0.0,
            last_position: None,
            last_position_at: None,
            odometer_m: 0.0,
            battery_percent: None,
        }
    }

    /// Trip requests for "VA" stall until released; every other vehicle
    /// answers immediately with a trip tagged by its code.
    struct StallingProvider {
        a_started: Notify,
        release_a: Notify,
        trip_calls: AtomicUsize,
    }

    impl StallingProvider {
        fn new() -> Self {
            Self {
                a_started: Notify::new(),
                release_a: Notify::new(),
                trip_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TelemetryProvider for StallingProvider {
        async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
            Ok(Vec::new())
        }

        async fn list_vehicles(&self, _group_code: &str) -> anyhow::Result<Vec<Vehicle>> {
            Ok(Vec::new())
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
            vehicle_code: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<Vec<Trip>> {
            self.trip_calls.fetch_add(1, Ordering::SeqCst);
            if vehicle_code == "VERR" {
                anyhow::bail!("upstream unavailable");
            }
            if vehicle_code == "VA" {
                self.a_started.notify_one();
                self.release_a.notified().await;
            }
            Ok(vec![trip_tagged(vehicle_code)])
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

    #[tokio::test]
    async fn test_slow_response_for_previous_selection_is_discarded() {
        let provider = Arc::new(StallingProvider::new());
        let service = Arc::new(DetailService::new(provider.clone()));

        // select A; its trip fetch stalls inside the provider
        let generation_a = service.reset().await;
        let slow = tokio::spawn({
            let service = service.clone();
            async move { service.fetch_trips(generation_a, &vehicle("VA")).await }
        });
        provider.a_started.notified().await;

        // select B before A resolves
        let generation_b = service.reset().await;
        service
            .fetch_trips(generation_b, &vehicle("VB"))
            .await
            .unwrap();

        // A resolves last and must not overwrite B's view
        provider.release_a.notify_one();
        slow.await.unwrap().unwrap();

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.trips.len(), 1);
        assert_eq!(snapshot.trips[0].duration_label, "VB");
        assert!(!snapshot.loading_trips);
    }

    #[tokio::test]
    async fn test_fetch_with_a_stale_token_never_issues_a_request() {
        let provider = Arc::new(StallingProvider::new());
        let service = DetailService::new(provider.clone());

        let generation_a = service.reset().await;
        let generation_b = service.reset().await;
        service
            .fetch_trips(generation_b, &vehicle("VB"))
            .await
            .unwrap();
        let calls = provider.trip_calls.load(Ordering::SeqCst);

        // a handler still holding A's token runs after B took over
        service
            .fetch_trips(generation_a, &vehicle("VA"))
            .await
            .unwrap();

        assert_eq!(provider.trip_calls.load(Ordering::SeqCst), calls);
        assert_eq!(service.trips().await[0].duration_label, "VB");
    }

    #[tokio::test]
    async fn test_failed_trip_fetch_clears_loading_and_leaves_empty() {
        let provider = Arc::new(StallingProvider::new());
        let service = DetailService::new(provider);

        let generation = service.generation().await;
        let result = service.fetch_trips(generation, &vehicle("VERR")).await;

        assert!(result.is_err());
        let snapshot = service.snapshot().await;
        assert!(snapshot.trips.is_empty());
        assert!(!snapshot.loading_trips);
    }

    #[tokio::test]
    async fn test_set_range_does_not_refetch() {
        let provider = Arc::new(StallingProvider::new());
        let service = DetailService::new(provider.clone());

        let range = DateRange::default();
        service.set_range(range).await;

        assert_eq!(provider.trip_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.range().await, range);
    }

    #[tokio::test]
    async fn test_fetch_history_leaves_coordinator_state_alone() {
        let provider = Arc::new(StallingProvider::new());
        let service = DetailService::new(provider);
        let generation = service.generation().await;
        service
            .fetch_trips(generation, &vehicle("VB"))
            .await
            .unwrap();

        let batches = service.fetch_history(&vehicle("VB")).await.unwrap();

        assert!(batches.is_empty());
        assert_eq!(service.trips().await.len(), 1);
    }
}
