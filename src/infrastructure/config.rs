// Service configuration loaded from config/fleet.toml
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct FleetConfig {
    pub server: ServerSettings,
    pub telemetry: TelemetrySettings,
    pub weather: WeatherSettings,
    pub geocoding: GeocodingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub base_url: String,
    pub api_key: String,
    /// Period of the automatic fleet refresh loop.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingSettings {
    pub base_url: String,
    /// Sent as the Accept-Language header on reverse lookups.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_refresh_seconds() -> u64 {
    60
}

fn default_locale() -> String {
    "en".to_string()
}

pub fn load_fleet_config() -> anyhow::Result<FleetConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/fleet"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_settings_default() {
        let config: FleetConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                bind = "127.0.0.1:8080"

                [telemetry]
                base_url = "https://telemetry.example.com"
                api_key = "secret"

                [weather]
                base_url = "https://api.open-meteo.com"

                [geocoding]
                base_url = "https://nominatim.openstreetmap.org"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.telemetry.refresh_seconds, 60);
        assert_eq!(config.geocoding.locale, "en");
    }
}
