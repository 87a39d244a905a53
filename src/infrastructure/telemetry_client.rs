// Fleet telemetry provider client
use crate::application::telemetry_provider::TelemetryProvider;
use crate::domain::eco::{EcoEvent, EcoEventKind, EcoSeverity, SPEED_UNAVAILABLE};
use crate::domain::position::{HistoryBatch, LatLng, PositionSample};
use crate::domain::trip::Trip;
use crate::domain::vehicle::{Group, Vehicle};
use crate::infrastructure::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct TelemetryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TelemetryClient {
    pub fn new(base_url: String, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("fleet-telemetry/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn vehicle_url(&self, vehicle_code: &str, leaf: &str) -> String {
        format!(
            "{}/vehicles/{}/{}",
            self.base_url,
            urlencoding::encode(vehicle_code),
            leaf
        )
    }

    async fn execute_get(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TelemetryProvider for TelemetryClient {
    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        let url = format!("{}/groups", self.base_url);
        let value = self.execute_get(&url, &[]).await?;
        let groups: Vec<GroupDto> = serde_json::from_value(value)?;
        Ok(groups.into_iter().map(GroupDto::into_domain).collect())
    }

    async fn list_vehicles(&self, group_code: &str) -> anyhow::Result<Vec<Vehicle>> {
        let url = format!(
            "{}/groups/{}/vehicles",
            self.base_url,
            urlencoding::encode(group_code)
        );
        let value = self.execute_get(&url, &[]).await?;
        let vehicles: Vec<VehicleDto> = serde_json::from_value(value)?;
        Ok(vehicles.into_iter().map(VehicleDto::into_domain).collect())
    }

    async fn get_history(
        &self,
        vehicle_code: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<Vec<HistoryBatch>> {
        let url = self.vehicle_url(vehicle_code, "history");
        let value = self
            .execute_get(&url, &[("from", from), ("to", to)])
            .await?;
        let batches: Vec<HistoryBatchDto> = serde_json::from_value(value)?;
        Ok(batches.into_iter().map(HistoryBatchDto::into_domain).collect())
    }

    async fn get_trips(
        &self,
        vehicle_code: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<Vec<Trip>> {
        let url = self.vehicle_url(vehicle_code, "trips");
        let value = self
            .execute_get(&url, &[("from", from), ("to", to)])
            .await?;
        // a null body means "no trips", same as an empty array
        if value.is_null() {
            return Ok(Vec::new());
        }
        let trips: Vec<TripDto> = serde_json::from_value(value)?;
        Ok(trips.into_iter().map(TripDto::into_domain).collect())
    }

    async fn get_eco_events(
        &self,
        vehicle_code: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<Vec<EcoEvent>> {
        let url = self.vehicle_url(vehicle_code, "eco-events");
        let value = self
            .execute_get(&url, &[("from", from), ("to", to)])
            .await?;
        Ok(parse_eco_events(value))
    }
}

/// The eco endpoint is known to return non-array payloads under some
/// provider conditions; treat those as "no events", not as a failure.
/// Individual rows that fail to parse are skipped the same way.
fn parse_eco_events(value: Value) -> Vec<EcoEvent> {
    let Value::Array(rows) = value else {
        tracing::warn!("eco-event payload was not an array, treating as empty");
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<EcoEventDto>(row) {
            Ok(dto) => Some(dto.into_domain()),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed eco-event row");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupDto {
    code: String,
    #[serde(default)]
    name: String,
}

impl GroupDto {
    fn into_domain(self) -> Group {
        Group {
            code: self.code,
            name: self.name,
        }
    }
}

/// Coordinates arrive as strings on this wire format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PositionDto {
    latitude: String,
    longitude: String,
}

impl PositionDto {
    fn parse(&self) -> Option<LatLng> {
        LatLng::parse(&self.latitude, &self.longitude)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VehicleDto {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    plate: String,
    #[serde(default)]
    speed: f64,
    last_position: Option<PositionDto>,
    last_position_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    odometer: f64,
    #[serde(default = "battery_unknown")]
    battery_percentage: i32,
}

fn battery_unknown() -> i32 {
    -1
}

impl VehicleDto {
    fn into_domain(self) -> Vehicle {
        Vehicle {
            last_position: self.last_position.as_ref().and_then(PositionDto::parse),
            last_position_at: self.last_position_timestamp,
            // the provider reports -1 for "no battery reading"
            battery_percent: u8::try_from(self.battery_percentage)
                .ok()
                .filter(|p| *p <= 100),
            code: self.code,
            name: self.name,
            plate: self.plate,
            speed: self.speed.max(0.0),
            odometer_m: self.odometer,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TripDto {
    start_position: Option<PositionDto>,
    finish_position: Option<PositionDto>,
    start_address: Option<String>,
    finish_address: Option<String>,
    #[serde(default)]
    total_distance: f64,
    #[serde(default)]
    average_speed: f64,
    #[serde(default)]
    max_speed: f64,
    #[serde(default)]
    duration: String,
    start_timestamp: DateTime<Utc>,
}

impl TripDto {
    fn into_domain(self) -> Trip {
        Trip {
            start_position: self.start_position.as_ref().and_then(PositionDto::parse),
            finish_position: self.finish_position.as_ref().and_then(PositionDto::parse),
            start_address: self.start_address,
            finish_address: self.finish_address,
            distance_m: self.total_distance,
            average_speed: self.average_speed,
            max_speed: self.max_speed,
            duration_label: self.duration,
            started_at: self.start_timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EcoEventDto {
    #[serde(default)]
    event_type: i32,
    #[serde(default)]
    severity: i32,
    timestamp: DateTime<Utc>,
    #[serde(default = "speed_sentinel")]
    speed: i32,
}

fn speed_sentinel() -> i32 {
    SPEED_UNAVAILABLE
}

impl EcoEventDto {
    fn into_domain(self) -> EcoEvent {
        EcoEvent {
            kind: EcoEventKind::from_code(self.event_type),
            severity: EcoSeverity::from_code(self.severity),
            at: self.timestamp,
            speed: self.speed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoryBatchDto {
    #[serde(default)]
    positions: Vec<HistoryPositionDto>,
}

impl HistoryBatchDto {
    fn into_domain(self) -> HistoryBatch {
        HistoryBatch {
            positions: self
                .positions
                .into_iter()
                .filter_map(HistoryPositionDto::into_domain)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoryPositionDto {
    latitude: String,
    longitude: String,
    #[serde(default)]
    speed: f64,
    timestamp: DateTime<Utc>,
}

impl HistoryPositionDto {
    fn into_domain(self) -> Option<PositionSample> {
        let position = LatLng::parse(&self.latitude, &self.longitude)?;
        Some(PositionSample {
            position,
            speed: self.speed,
            at: self.timestamp,
        })
    }
}
