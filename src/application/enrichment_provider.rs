// Provider traits for best-effort enrichment lookups
use crate::domain::enrichment::{AddressLabel, WeatherSnapshot};
use async_trait::async_trait;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather at a coordinate pair.
    async fn current_weather(&self, lat: f64, lng: f64) -> anyhow::Result<WeatherSnapshot>;
}

#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Reverse-geocode a coordinate pair. `Ok(None)` means the provider
    /// answered but had no usable address.
    async fn reverse(&self, lat: f64, lng: f64) -> anyhow::Result<Option<AddressLabel>>;
}
