// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod error;
pub mod geocode_client;
pub mod telemetry_client;
pub mod weather_client;
