// Vehicle and group domain models
use super::position::LatLng;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A vehicle group. The first available group is selected at startup;
/// there is no multi-group navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub code: String,
    pub name: String,
}

/// One vehicle of the active group. The collection is replaced wholesale
/// on every fleet refresh; there is no partial mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub code: String,
    pub name: String,
    pub plate: String,
    /// Current speed in km/h, never negative.
    pub speed: f64,
    /// Absent when the vehicle has never reported a position.
    pub last_position: Option<LatLng>,
    pub last_position_at: Option<DateTime<Utc>>,
    /// Odometer reading in metres.
    pub odometer_m: f64,
    /// 0-100, `None` when the provider reports no battery reading.
    pub battery_percent: Option<u8>,
}

impl Vehicle {
    pub fn is_moving(&self) -> bool {
        self.speed > 0.0
    }
}

/// Fleet-wide statistics. Always a pure function of the current vehicle
/// collection, recomputed on every read and never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetStats {
    pub moving: usize,
    pub idle: usize,
    /// Arithmetic mean of the moving vehicles' speeds, rounded to the
    /// nearest integer; 0 when nothing is moving.
    pub avg_speed: i64,
}

impl FleetStats {
    pub fn compute(vehicles: &[Vehicle]) -> Self {
        let moving = vehicles.iter().filter(|v| v.is_moving()).count();
        let idle = vehicles.len() - moving;
        let avg_speed = if moving == 0 {
            0
        } else {
            let total: f64 = vehicles
                .iter()
                .filter(|v| v.is_moving())
                .map(|v| v.speed)
                .sum();
            (total / moving as f64).round() as i64
        };
        Self {
            moving,
            idle,
            avg_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(code: &str, speed: f64) -> Vehicle {
        Vehicle {
            code: code.to_string(),
            name: format!("Vehicle {code}"),
            plate: String::new(),
            speed,
            last_position: None,
            last_position_at: None,
            odometer_m: 0.0,
            battery_percent: None,
        }
    }

    #[test]
    fn test_stats_scenario() {
        let vehicles = vec![vehicle("V1", 0.0), vehicle("V2", 45.0), vehicle("V3", 120.0)];
        let stats = FleetStats::compute(&vehicles);
        assert_eq!(stats.moving, 2);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.avg_speed, 83);
    }

    #[test]
    fn test_stats_counts_partition_the_fleet() {
        let vehicles = vec![
            vehicle("V1", 0.0),
            vehicle("V2", 12.5),
            vehicle("V3", 0.0),
            vehicle("V4", 88.0),
        ];
        let stats = FleetStats::compute(&vehicles);
        assert_eq!(stats.moving + stats.idle, vehicles.len());
    }

    #[test]
    fn test_stats_all_idle() {
        let vehicles = vec![vehicle("V1", 0.0), vehicle("V2", 0.0)];
        let stats = FleetStats::compute(&vehicles);
        assert_eq!(stats.moving, 0);
        assert_eq!(stats.avg_speed, 0);
    }

    #[test]
    fn test_stats_empty_fleet() {
        let stats = FleetStats::compute(&[]);
        assert_eq!(stats.moving, 0);
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.avg_speed, 0);
    }
}
