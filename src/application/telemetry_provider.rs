// Provider trait for fleet telemetry data access
use crate::domain::eco::EcoEvent;
use crate::domain::position::HistoryBatch;
use crate::domain::trip::Trip;
use crate::domain::vehicle::{Group, Vehicle};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    /// List all vehicle groups visible to the credential.
    async fn list_groups(&self) -> anyhow::Result<Vec<Group>>;

    /// List the vehicles of one group.
    async fn list_vehicles(&self, group_code: &str) -> anyhow::Result<Vec<Vehicle>>;

    /// Position history batches for a vehicle inside the query window.
    /// `from`/`to` are ISO local timestamps.
    async fn get_history(
        &self,
        vehicle_code: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<Vec<HistoryBatch>>;

    /// Trips of a vehicle inside the query window.
    async fn get_trips(&self, vehicle_code: &str, from: &str, to: &str)
        -> anyhow::Result<Vec<Trip>>;

    /// Eco events of a vehicle inside the query window. Implementations
    /// normalize a malformed (non-array) provider payload to an empty
    /// collection instead of failing.
    async fn get_eco_events(
        &self,
        vehicle_code: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<Vec<EcoEvent>>;
}
