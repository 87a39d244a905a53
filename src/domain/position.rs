// Geographic primitives shared by the map layers
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A validated coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Parse the provider's string coordinates. Anything unparsable yields
    /// `None` and the entity is excluded from rendering.
    pub fn parse(lat: &str, lng: &str) -> Option<Self> {
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Self::new(lat, lng)
    }
}

/// One point of a vehicle's position history, time-ascending within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct PositionSample {
    pub position: LatLng,
    pub speed: f64,
    pub at: DateTime<Utc>,
}

/// A raw batch of position samples as returned by one history query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryBatch {
    pub positions: Vec<PositionSample>,
}

/// Axis-aligned bounding box used to fit the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    /// Bounding box of all points, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut bounds: Option<LatLngBounds> = None;
        for point in points {
            bounds = Some(match bounds {
                None => LatLngBounds {
                    south: point.lat,
                    west: point.lng,
                    north: point.lat,
                    east: point.lng,
                },
                Some(b) => LatLngBounds {
                    south: b.south.min(point.lat),
                    west: b.west.min(point.lng),
                    north: b.north.max(point.lat),
                    east: b.east.max(point.lng),
                },
            });
        }
        bounds
    }
}
