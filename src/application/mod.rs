// Application layer - Coordinators, map engine, and provider seams
pub mod detail_service;
pub mod enrichment_provider;
pub mod enrichment_service;
pub mod fleet_service;
pub mod map_engine;
pub mod orchestrator;
pub mod render;
pub mod telemetry_provider;
