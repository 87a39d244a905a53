// Map rendering engine - live markers, history routes, and the mode machine
use crate::domain::position::{LatLng, LatLngBounds, PositionSample};
use crate::domain::selection::MapMode;
use crate::domain::trip::Trip;
use crate::domain::vehicle::Vehicle;
use serde::Serialize;

/// Viewport padding applied when fitting a route, in pixels.
pub const FIT_PADDING_PX: u32 = 40;

/// Speed banding for history segments: three fixed tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedBand {
    Low,
    Mid,
    High,
}

impl SpeedBand {
    pub fn for_kmh(speed: f64) -> Self {
        if speed <= 60.0 {
            Self::Low
        } else if speed <= 90.0 {
            Self::Mid
        } else {
            Self::High
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#4caf50",
            Self::Mid => "#ff9800",
            Self::High => "#f44336",
        }
    }
}

/// Visual treatment of a live marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    Idle,
    Moving,
}

/// One rendered live marker. Carries the vehicle code so a marker click
/// can feed the same selection entry point as a list click.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleMarker {
    pub vehicle_code: String,
    pub name: String,
    pub position: LatLng,
    pub style: MarkerStyle,
    pub speed: f64,
}

/// One colored segment of a history trail.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSegment {
    pub from: LatLng,
    pub to: LatLng,
    pub color: &'static str,
}

/// Content of the route layer. Exactly one of these occupies the layer at
/// a time; drawing replaces whatever was there.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteLayer {
    /// A position trail with distinct start/end markers.
    Trail {
        segments: Vec<RouteSegment>,
        start: LatLng,
        end: LatLng,
    },
    /// Start/finish pin pair for a single inspected trip, joined by a
    /// straight guide line.
    TripPins { start: LatLng, finish: LatLng },
}

/// Imperative operations the engine issues against the concrete surface.
/// The engine is the only component that touches the surface or its two
/// layers.
pub trait MapSurface: Send {
    fn render_markers(&mut self, markers: &[VehicleMarker]);
    fn render_route(&mut self, route: &RouteLayer);
    fn clear_route(&mut self);
    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32);
    fn pan_to(&mut self, center: LatLng);
}

/// Owns the marker layer, the route layer, and the live/history mode
/// machine. Layer models are retained so a surface attached later can be
/// brought up to date.
pub struct MapEngine {
    surface: Option<Box<dyn MapSurface>>,
    mode: MapMode,
    markers: Vec<VehicleMarker>,
    route: Option<RouteLayer>,
}

impl MapEngine {
    pub fn new() -> Self {
        Self {
            surface: None,
            mode: MapMode::Live,
            markers: Vec::new(),
            route: None,
        }
    }

    /// Attach the concrete surface once its container exists. The current
    /// layers are replayed onto it. A second attach while one is live is
    /// ignored; the engine is never double-initialized.
    pub fn attach(&mut self, mut surface: Box<dyn MapSurface>) {
        if self.surface.is_some() {
            tracing::warn!("map surface already attached, ignoring");
            return;
        }
        if self.mode == MapMode::Live {
            surface.render_markers(&self.markers);
        }
        if let Some(route) = &self.route {
            surface.render_route(route);
        }
        self.surface = Some(surface);
    }

    /// Tear the surface down. Safe to call when never attached.
    pub fn detach(&mut self) {
        self.surface = None;
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// Rebuild the live marker set from the vehicle collection. Vehicles
    /// without a valid position are omitted, not rendered at origin. In
    /// history mode the set is retained but not rendered.
    pub fn update_markers(&mut self, vehicles: &[Vehicle]) {
        self.markers = vehicles.iter().filter_map(marker_for).collect();
        if self.mode == MapMode::Live {
            if let Some(surface) = &mut self.surface {
                surface.render_markers(&self.markers);
            }
        }
    }

    /// Enter history mode: clear the marker layer and render the trail.
    /// An empty sample set renders nothing and leaves the route empty.
    pub fn draw_history(&mut self, samples: &[PositionSample]) {
        self.mode = MapMode::History;

        let trail = samples.first().zip(samples.last()).map(|(first, last)| {
            let segments = samples
                .windows(2)
                .map(|pair| RouteSegment {
                    from: pair[0].position,
                    to: pair[1].position,
                    color: SpeedBand::for_kmh(pair[0].speed).color(),
                })
                .collect();
            RouteLayer::Trail {
                segments,
                start: first.position,
                end: last.position,
            }
        });

        self.route = trail;
        if let Some(surface) = &mut self.surface {
            surface.render_markers(&[]);
            match &self.route {
                Some(route) => surface.render_route(route),
                None => surface.clear_route(),
            }
            if let Some(bounds) = LatLngBounds::from_points(samples.iter().map(|s| s.position)) {
                surface.fit_bounds(bounds, FIT_PADDING_PX);
            }
        }
    }

    /// Leave history mode: clear the route layer and restore the retained
    /// live marker set.
    pub fn clear_history(&mut self) {
        self.mode = MapMode::Live;
        self.route = None;
        if let Some(surface) = &mut self.surface {
            surface.clear_route();
            surface.render_markers(&self.markers);
        }
    }

    /// Overlay start/finish pins for a single trip, replacing any route
    /// layer content. Mode-independent; trips without resolvable endpoints
    /// are skipped.
    pub fn draw_trip_pins(&mut self, trip: &Trip) {
        let (Some(start), Some(finish)) = (trip.start_position, trip.finish_position) else {
            tracing::debug!("trip has no resolvable endpoints, skipping pins");
            return;
        };
        let route = RouteLayer::TripPins { start, finish };
        if let Some(surface) = &mut self.surface {
            surface.render_route(&route);
            if let Some(bounds) = LatLngBounds::from_points([start, finish]) {
                surface.fit_bounds(bounds, FIT_PADDING_PX);
            }
        }
        self.route = Some(route);
    }

    /// Center the viewport on one vehicle; no-op without coordinates.
    pub fn pan_to(&mut self, vehicle: &Vehicle) {
        let Some(position) = vehicle.last_position else {
            return;
        };
        if let Some(surface) = &mut self.surface {
            surface.pan_to(position);
        }
    }

    /// Fit the viewport around every vehicle with a position; no-op when
    /// none has one.
    pub fn fit_all(&mut self, vehicles: &[Vehicle]) {
        let points = vehicles.iter().filter_map(|v| v.last_position);
        let Some(bounds) = LatLngBounds::from_points(points) else {
            return;
        };
        if let Some(surface) = &mut self.surface {
            surface.fit_bounds(bounds, FIT_PADDING_PX);
        }
    }

    pub fn markers(&self) -> &[VehicleMarker] {
        &self.markers
    }

    pub fn route(&self) -> Option<&RouteLayer> {
        self.route.as_ref()
    }
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn marker_for(vehicle: &Vehicle) -> Option<VehicleMarker> {
    let position = vehicle.last_position?;
    Some(VehicleMarker {
        vehicle_code: vehicle.code.clone(),
        name: vehicle.name.clone(),
        position,
        style: if vehicle.is_moving() {
            MarkerStyle::Moving
        } else {
            MarkerStyle::Idle
        },
        speed: vehicle.speed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        markers: Vec<VehicleMarker>,
        route: Option<RouteLayer>,
        fitted: Option<LatLngBounds>,
        panned: Option<LatLng>,
    }

    #[derive(Clone, Default)]
    struct RecordingSurface {
        recorded: Arc<Mutex<Recorded>>,
    }

    impl MapSurface for RecordingSurface {
        fn render_markers(&mut self, markers: &[VehicleMarker]) {
            self.recorded.lock().unwrap().markers = markers.to_vec();
        }

        fn render_route(&mut self, route: &RouteLayer) {
            self.recorded.lock().unwrap().route = Some(route.clone());
        }

        fn clear_route(&mut self) {
            self.recorded.lock().unwrap().route = None;
        }

        fn fit_bounds(&mut self, bounds: LatLngBounds, _padding_px: u32) {
            self.recorded.lock().unwrap().fitted = Some(bounds);
        }

        fn pan_to(&mut self, center: LatLng) {
            self.recorded.lock().unwrap().panned = Some(center);
        }
    }

    fn vehicle(code: &str, speed: f64, position: Option<(f64, f64)>) -> Vehicle {
        Vehicle {
            code: code.to_string(),
            name: code.to_string(),
            plate: String::new(),
            speed,
            last_position: position.and_then(|(lat, lng)| LatLng::new(lat, lng)),
            last_position_at: None,
            odometer_m: 0.0,
            battery_percent: None,
        }
    }

    fn sample(lat: f64, lng: f64, speed: f64) -> PositionSample {
        PositionSample {
            position: LatLng::new(lat, lng).unwrap(),
            speed,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_speed_bands() {
        assert_eq!(SpeedBand::for_kmh(0.0), SpeedBand::Low);
        assert_eq!(SpeedBand::for_kmh(60.0), SpeedBand::Low);
        assert_eq!(SpeedBand::for_kmh(60.1), SpeedBand::Mid);
        assert_eq!(SpeedBand::for_kmh(90.0), SpeedBand::Mid);
        assert_eq!(SpeedBand::for_kmh(90.1), SpeedBand::High);
    }

    #[test]
    fn test_positionless_vehicles_are_omitted() {
        let mut engine = MapEngine::new();
        engine.update_markers(&[
            vehicle("V1", 0.0, Some((48.2, 16.3))),
            vehicle("V2", 30.0, None),
        ]);

        assert_eq!(engine.markers().len(), 1);
        assert_eq!(engine.markers()[0].vehicle_code, "V1");
        assert_eq!(engine.markers()[0].style, MarkerStyle::Idle);
    }

    #[test]
    fn test_empty_history_renders_nothing_and_does_not_panic() {
        let surface = RecordingSurface::default();
        let recorded = surface.recorded.clone();
        let mut engine = MapEngine::new();
        engine.attach(Box::new(surface));

        engine.draw_history(&[]);

        assert_eq!(engine.mode(), MapMode::History);
        assert!(engine.route().is_none());
        let rec = recorded.lock().unwrap();
        assert!(rec.markers.is_empty());
        assert!(rec.route.is_none());
    }

    #[test]
    fn test_history_then_clear_restores_markers() {
        let surface = RecordingSurface::default();
        let recorded = surface.recorded.clone();
        let mut engine = MapEngine::new();
        engine.attach(Box::new(surface));
        engine.update_markers(&[
            vehicle("V1", 0.0, Some((48.2, 16.3))),
            vehicle("V2", 30.0, Some((48.3, 16.4))),
        ]);

        engine.draw_history(&[
            sample(48.2, 16.3, 40.0),
            sample(48.25, 16.35, 75.0),
            sample(48.3, 16.4, 110.0),
        ]);

        {
            let rec = recorded.lock().unwrap();
            assert!(rec.markers.is_empty());
            let Some(RouteLayer::Trail { segments, .. }) = &rec.route else {
                panic!("expected a trail");
            };
            assert_eq!(segments.len(), 2);
            assert_eq!(segments[0].color, SpeedBand::Low.color());
            assert_eq!(segments[1].color, SpeedBand::Mid.color());
            assert!(rec.fitted.is_some());
        }

        engine.clear_history();

        assert_eq!(engine.mode(), MapMode::Live);
        assert!(engine.route().is_none());
        let rec = recorded.lock().unwrap();
        assert!(rec.route.is_none());
        assert_eq!(rec.markers.len(), 2);
    }

    #[test]
    fn test_attach_replays_retained_layers() {
        let mut engine = MapEngine::new();
        engine.update_markers(&[vehicle("V1", 12.0, Some((48.2, 16.3)))]);

        let surface = RecordingSurface::default();
        let recorded = surface.recorded.clone();
        engine.attach(Box::new(surface));

        assert_eq!(recorded.lock().unwrap().markers.len(), 1);
    }

    #[test]
    fn test_second_attach_is_ignored_and_detach_is_idempotent() {
        let first = RecordingSurface::default();
        let first_recorded = first.recorded.clone();
        let mut engine = MapEngine::new();
        engine.attach(Box::new(first));
        engine.attach(Box::new(RecordingSurface::default()));

        engine.update_markers(&[vehicle("V1", 12.0, Some((48.2, 16.3)))]);
        assert_eq!(first_recorded.lock().unwrap().markers.len(), 1);

        engine.detach();
        engine.detach();
        assert!(!engine.is_attached());
    }

    #[test]
    fn test_trip_pins_replace_route_content() {
        let surface = RecordingSurface::default();
        let recorded = surface.recorded.clone();
        let mut engine = MapEngine::new();
        engine.attach(Box::new(surface));
        engine.draw_history(&[sample(48.2, 16.3, 40.0), sample(48.3, 16.4, 50.0)]);

        let trip = Trip {
            start_position: LatLng::new(48.2, 16.3),
            finish_position: LatLng::new(48.4, 16.5),
            start_address: None,
            finish_address: None,
            distance_m: 5000.0,
            average_speed: 44.0,
            max_speed: 60.0,
            duration_label: "12 min".to_string(),
            started_at: Utc::now(),
        };
        engine.draw_trip_pins(&trip);

        let rec = recorded.lock().unwrap();
        assert!(matches!(rec.route, Some(RouteLayer::TripPins { .. })));
    }

    #[test]
    fn test_pan_to_without_coordinates_is_a_noop() {
        let surface = RecordingSurface::default();
        let recorded = surface.recorded.clone();
        let mut engine = MapEngine::new();
        engine.attach(Box::new(surface));

        engine.pan_to(&vehicle("V1", 0.0, None));
        assert!(recorded.lock().unwrap().panned.is_none());

        engine.pan_to(&vehicle("V2", 0.0, Some((48.2, 16.3))));
        assert!(recorded.lock().unwrap().panned.is_some());
    }
}
