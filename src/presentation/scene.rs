// Serializable map scene - the thin client renders this verbatim
use crate::application::map_engine::{MapSurface, RouteLayer, VehicleMarker};
use crate::domain::position::{LatLng, LatLngBounds};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Current viewport instruction for the tile renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Viewport {
    Center { center: LatLng },
    Fit { bounds: LatLngBounds, padding_px: u32 },
}

/// Everything the map view needs to draw one frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapScene {
    pub markers: Vec<VehicleMarker>,
    pub route: Option<RouteLayer>,
    pub viewport: Option<Viewport>,
}

/// Shared handle onto the scene; the GET handler reads it while the
/// engine writes through an attached `SceneSurface`.
#[derive(Clone, Default)]
pub struct SceneHandle {
    scene: Arc<Mutex<MapScene>>,
}

impl SceneHandle {
    pub fn snapshot(&self) -> MapScene {
        self.scene.lock().unwrap().clone()
    }
}

/// `MapSurface` implementation that records the engine's imperative
/// operations into the shared scene.
pub struct SceneSurface {
    scene: Arc<Mutex<MapScene>>,
}

impl SceneSurface {
    pub fn new(handle: &SceneHandle) -> Self {
        Self {
            scene: handle.scene.clone(),
        }
    }
}

impl MapSurface for SceneSurface {
    fn render_markers(&mut self, markers: &[VehicleMarker]) {
        self.scene.lock().unwrap().markers = markers.to_vec();
    }

    fn render_route(&mut self, route: &RouteLayer) {
        self.scene.lock().unwrap().route = Some(route.clone());
    }

    fn clear_route(&mut self) {
        self.scene.lock().unwrap().route = None;
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32) {
        self.scene.lock().unwrap().viewport = Some(Viewport::Fit { bounds, padding_px });
    }

    fn pan_to(&mut self, center: LatLng) {
        self.scene.lock().unwrap().viewport = Some(Viewport::Center { center });
    }
}
