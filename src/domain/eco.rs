// Eco-event domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sentinel speed meaning "no speed reading available". Must never be
/// plotted or enter any aggregation.
pub const SPEED_UNAVAILABLE: i32 = i32::MIN;

/// Driving-behavior incident types. Closed enumeration of provider codes
/// 0-9; unrecognized codes map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EcoEventKind {
    Unknown,
    HarshAcceleration,
    HarshBraking,
    HarshCornering,
    Speeding,
    ExcessiveIdling,
    SharpLaneChange,
    OverRevving,
    FatigueWarning,
    SeatbeltViolation,
}

impl EcoEventKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::HarshAcceleration,
            2 => Self::HarshBraking,
            3 => Self::HarshCornering,
            4 => Self::Speeding,
            5 => Self::ExcessiveIdling,
            6 => Self::SharpLaneChange,
            7 => Self::OverRevving,
            8 => Self::FatigueWarning,
            9 => Self::SeatbeltViolation,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::HarshAcceleration => "Harsh acceleration",
            Self::HarshBraking => "Harsh braking",
            Self::HarshCornering => "Harsh cornering",
            Self::Speeding => "Speeding",
            Self::ExcessiveIdling => "Excessive idling",
            Self::SharpLaneChange => "Sharp lane change",
            Self::OverRevving => "Over-revving",
            Self::FatigueWarning => "Fatigue warning",
            Self::SeatbeltViolation => "Seatbelt violation",
        }
    }
}

/// Incident severity, provider codes 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EcoSeverity {
    Info,
    Low,
    Medium,
    High,
}

impl EcoSeverity {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Info,
        }
    }
}

/// One detected driving-behavior incident.
#[derive(Debug, Clone, Serialize)]
pub struct EcoEvent {
    pub kind: EcoEventKind,
    pub severity: EcoSeverity,
    pub at: DateTime<Utc>,
    /// Raw speed in km/h, `SPEED_UNAVAILABLE` when the reading is missing.
    pub speed: i32,
}

impl EcoEvent {
    /// The speed reading with the sentinel hidden.
    pub fn speed_reading(&self) -> Option<i32> {
        (self.speed != SPEED_UNAVAILABLE).then_some(self.speed)
    }

    pub fn speed_label(&self) -> String {
        match self.speed_reading() {
            Some(speed) => format!("{speed} km/h"),
            None => "N/A".to_string(),
        }
    }
}

/// Mean speed across events with a real reading; sentinel values are
/// excluded, not averaged as zero.
pub fn average_event_speed(events: &[EcoEvent]) -> Option<f64> {
    let readings: Vec<i32> = events.iter().filter_map(|e| e.speed_reading()).collect();
    if readings.is_empty() {
        return None;
    }
    Some(readings.iter().sum::<i32>() as f64 / readings.len() as f64)
}
