// Presentation layer - HTTP facade, map scene, and chart targets
pub mod app_state;
pub mod charts;
pub mod handlers;
pub mod scene;
