// Enrichment coordinator - best-effort weather and address lookups
use crate::application::enrichment_provider::{GeocodeProvider, WeatherProvider};
use crate::domain::enrichment::{AddressLabel, WeatherSnapshot};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct EnrichmentState {
    /// Bumped on every selection change; late results with an older stamp
    /// are dropped instead of decorating the wrong vehicle.
    generation: u64,
    weather: Option<WeatherSnapshot>,
    address: Option<AddressLabel>,
    loading_weather: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSnapshot {
    pub weather: Option<WeatherSnapshot>,
    pub address: Option<AddressLabel>,
    pub loading_weather: bool,
}

/// Decorative side-fetches tied to the current selection. Failures are
/// logged and swallowed; nothing here may block or corrupt primary state.
pub struct EnrichmentService {
    weather: Arc<dyn WeatherProvider>,
    geocode: Arc<dyn GeocodeProvider>,
    state: Mutex<EnrichmentState>,
}

impl EnrichmentService {
    pub fn new(weather: Arc<dyn WeatherProvider>, geocode: Arc<dyn GeocodeProvider>) -> Self {
        Self {
            weather,
            geocode,
            state: Mutex::new(EnrichmentState::default()),
        }
    }

    /// Drop weather and address state ahead of a new selection and return
    /// the new generation; fetches dispatched for this selection present
    /// it so late arrivals for older selections fall on the floor.
    pub async fn reset(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.weather = None;
        state.address = None;
        state.loading_weather = false;
        state.generation
    }

    pub async fn fetch_weather(&self, generation: u64, lat: f64, lng: f64) {
        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                return;
            }
            state.weather = None;
            state.loading_weather = true;
        }

        let result = self.weather.current_weather(lat, lng).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!("discarding weather for a stale selection");
            return;
        }
        state.loading_weather = false;
        match result {
            Ok(snapshot) => state.weather = Some(snapshot),
            // decorative data: log once, never retry, never surface
            Err(e) => tracing::warn!(error = %e, "weather lookup failed"),
        }
    }

    pub async fn fetch_address(&self, generation: u64, lat: f64, lng: f64) {
        if self.state.lock().await.generation != generation {
            return;
        }

        let result = self.geocode.reverse(lat, lng).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!("discarding address for a stale selection");
            return;
        }
        match result {
            Ok(address) => state.address = address,
            Err(e) => tracing::warn!(error = %e, "reverse geocoding failed"),
        }
    }

    pub async fn snapshot(&self) -> EnrichmentSnapshot {
        let state = self.state.lock().await;
        EnrichmentSnapshot {
            weather: state.weather.clone(),
            address: state.address.clone(),
            loading_weather: state.loading_weather,
        }
    }
}
