// Trip domain model
use super::position::LatLng;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A completed trip of one vehicle. Immutable once fetched; the active
/// trip set is replaced wholesale on every fetch.
#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    /// `None` when the provider reported an unparsable endpoint; the trip
    /// still appears in the list but is excluded from map rendering.
    pub start_position: Option<LatLng>,
    pub finish_position: Option<LatLng>,
    /// Enrichment-provided upstream, may be missing.
    pub start_address: Option<String>,
    pub finish_address: Option<String>,
    pub distance_m: f64,
    pub average_speed: f64,
    pub max_speed: f64,
    pub duration_label: String,
    pub started_at: DateTime<Utc>,
}
