// Selection state read by the orchestrator to decide what to (re)fetch
use super::vehicle::Vehicle;
use serde::Serialize;

/// Active tab of the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    #[default]
    Trips,
    Eco,
}

impl DetailTab {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trips" => Some(Self::Trips),
            "eco" => Some(Self::Eco),
            _ => None,
        }
    }
}

/// Map view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    #[default]
    Live,
    History,
}

impl MapMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(Self::Live),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

/// The single source of truth for what is currently selected.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub vehicle: Option<Vehicle>,
    pub tab: DetailTab,
    pub mode: MapMode,
}
