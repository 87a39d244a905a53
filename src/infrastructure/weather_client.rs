// Weather provider client (open-meteo compatible, no key required)
use crate::application::enrichment_provider::WeatherProvider;
use crate::domain::enrichment::{WeatherCondition, WeatherSnapshot};
use crate::infrastructure::error::ProviderError;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherDto>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherDto {
    temperature: f64,
    windspeed: f64,
    weathercode: u16,
}

impl WeatherClient {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("fleet-telemetry/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn current_weather(&self, lat: f64, lng: f64) -> anyhow::Result<WeatherSnapshot> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .map_err(ProviderError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body }.into());
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .context("parsing forecast response")?;
        let current = forecast
            .current_weather
            .context("forecast response carried no current weather")?;

        Ok(WeatherSnapshot {
            temperature_c: current.temperature,
            wind_speed_kmh: current.windspeed,
            condition: WeatherCondition::from_code(current.weathercode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forecast_payload_maps_through_the_condition_table() {
        let forecast: ForecastResponse = serde_json::from_value(json!({
            "latitude": 48.2,
            "longitude": 16.37,
            "current_weather": {
                "temperature": 11.3,
                "windspeed": 19.4,
                "weathercode": 61,
                "winddirection": 250
            }
        }))
        .unwrap();

        let current = forecast.current_weather.unwrap();
        assert_eq!(current.temperature, 11.3);
        assert_eq!(
            WeatherCondition::from_code(current.weathercode),
            WeatherCondition::Rain
        );
    }
}
