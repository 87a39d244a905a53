// Weather and address enrichment models
use serde::Serialize;

/// Weather conditions mapped from the provider's WMO-style code table.
/// Closed enumeration; unrecognized codes fall back to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherCondition {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherCondition {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80 | 81 | 82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::SnowGrains => "Snow grains",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with hail",
            Self::Unknown => "Unknown conditions",
        }
    }

    /// Icon key the presentation layer maps to a glyph.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::ClearSky | Self::MainlyClear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Overcast => "cloud",
            Self::Fog => "fog",
            Self::Drizzle | Self::FreezingDrizzle => "drizzle",
            Self::Rain | Self::FreezingRain | Self::RainShowers => "rain",
            Self::Snow | Self::SnowGrains | Self::SnowShowers => "snow",
            Self::Thunderstorm | Self::ThunderstormWithHail => "storm",
            Self::Unknown => "unknown",
        }
    }
}

/// Current weather at the selected vehicle's position. Ephemeral,
/// recomputed per selection, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub condition: WeatherCondition,
}

/// Short human-readable address tied to the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressLabel {
    pub label: String,
}

impl AddressLabel {
    /// Prefer a "road, city" composition; fall back to the provider's full
    /// display name; `None` when neither is available.
    pub fn compose(
        road: Option<&str>,
        city: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<Self> {
        match (road, city) {
            (Some(road), Some(city)) if !road.is_empty() && !city.is_empty() => Some(Self {
                label: format!("{road}, {city}"),
            }),
            _ => display_name
                .filter(|name| !name.is_empty())
                .map(|name| Self {
                    label: name.to_string(),
                }),
        }
    }
}
