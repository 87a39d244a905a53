// Chart dataset models handed to the chart renderer
use super::eco::{EcoEvent, EcoEventKind};
use super::trip::Trip;
use serde::Serialize;

const TRIP_SPEED_COLOR: &str = "#1976d2";

const ECO_PALETTE: [&str; 9] = [
    "#e53935", "#fb8c00", "#fdd835", "#43a047", "#00acc1", "#3949ab", "#8e24aa", "#6d4c41",
    "#757575",
];

/// Named render targets the chart renderer is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartTarget {
    TripSpeed,
    EcoBreakdown,
}

impl ChartTarget {
    pub fn id(&self) -> &'static str {
        match self {
            Self::TripSpeed => "trip-speed",
            Self::EcoBreakdown => "eco-breakdown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trip-speed" => Some(Self::TripSpeed),
            "eco-breakdown" => Some(Self::EcoBreakdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

/// A fully computed chart. The renderer draws it as-is; no further
/// derivation happens downstream.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Bar chart of average trip speeds, one bar per trip in fetch order.
pub fn trip_speed_chart(trips: &[Trip]) -> ChartData {
    let labels = trips
        .iter()
        .map(|t| t.started_at.format("%d/%m %H:%M").to_string())
        .collect();
    let values: Vec<f64> = trips.iter().map(|t| t.average_speed).collect();
    let colors = vec![TRIP_SPEED_COLOR.to_string(); values.len()];

    ChartData {
        id: ChartTarget::TripSpeed.id().to_string(),
        title: "Average trip speed (km/h)".to_string(),
        kind: ChartKind::Bar,
        labels,
        datasets: vec![Dataset {
            label: "Average speed".to_string(),
            values,
            colors,
        }],
    }
}

/// Doughnut chart of eco-event counts per kind. Kinds without events are
/// omitted. Counting never touches the speed field, so sentinel speeds
/// cannot leak in here.
pub fn eco_breakdown_chart(events: &[EcoEvent]) -> ChartData {
    let mut counts: Vec<(EcoEventKind, usize)> = Vec::new();
    for event in events {
        match counts.iter_mut().find(|(kind, _)| *kind == event.kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((event.kind, 1)),
        }
    }

    let labels = counts.iter().map(|(kind, _)| kind.label().to_string()).collect();
    let values = counts.iter().map(|(_, count)| *count as f64).collect();
    let colors = counts
        .iter()
        .enumerate()
        .map(|(i, _)| ECO_PALETTE[i % ECO_PALETTE.len()].to_string())
        .collect();

    ChartData {
        id: ChartTarget::EcoBreakdown.id().to_string(),
        title: "Eco events by type".to_string(),
        kind: ChartKind::Doughnut,
        labels,
        datasets: vec![Dataset {
            label: "Events".to_string(),
            values,
            colors,
        }],
    }
}
