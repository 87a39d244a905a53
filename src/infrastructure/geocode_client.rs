// Reverse geocoding client (nominatim compatible, no key required)
use crate::application::enrichment_provider::GeocodeProvider;
use crate::domain::enrichment::AddressLabel;
use crate::infrastructure::error::ProviderError;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    locale: String,
}

#[derive(Debug, Deserialize, Default)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<AddressDto>,
}

#[derive(Debug, Deserialize, Default)]
struct AddressDto {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl ReverseResponse {
    /// Prefer "road, city"; the provider labels the locality as city,
    /// town, or village depending on its size.
    fn into_label(self) -> Option<AddressLabel> {
        let address = self.address.unwrap_or_default();
        let locality = address.city.or(address.town).or(address.village);
        AddressLabel::compose(
            address.road.as_deref(),
            locality.as_deref(),
            self.display_name.as_deref(),
        )
    }
}

impl GeocodeClient {
    pub fn new(base_url: String, locale: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("fleet-telemetry/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            locale,
        })
    }
}

#[async_trait]
impl GeocodeProvider for GeocodeClient {
    async fn reverse(&self, lat: f64, lng: f64) -> anyhow::Result<Option<AddressLabel>> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("format", "jsonv2".to_string()),
            ])
            .header("Accept-Language", &self.locale)
            .send()
            .await
            .map_err(ProviderError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body }.into());
        }

        let reverse: ReverseResponse = response
            .json()
            .await
            .context("parsing reverse geocoding response")?;
        Ok(reverse.into_label())
    }
}
