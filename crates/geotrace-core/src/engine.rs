//! Composition root of the telemetry path engine.
//!
//! The engine owns the registry and the renderer and shares the terrain
//! resolver with whoever prepares its inputs. Every inbound operation takes
//! already-absolute positions; altitude correction happens before the call
//! (see [`TerrainHeightResolver::absolute`]).

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::controller::{Controller, StationController, VehicleController};
use crate::determined_route::RouteStyle;
use crate::distance::DistanceReading;
use crate::error::EngineError;
use crate::live_path::LivePathStyle;
use crate::models::{GeoPoint, Orientation, ScalarRange, TrackedKind};
use crate::registry::EntityRegistry;
use crate::render::{Renderable, Renderer};
use crate::spatial::WorldPosition;
use crate::terrain::{AltitudeMode, TerrainHeightResolver};

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Vehicle move animation
    pub animation_duration: Duration,
    /// Station move animation; zero snaps
    pub station_animation_duration: Duration,
    pub altitude_mode: AltitudeMode,
    pub live_path: LivePathStyle,
    pub route: RouteStyle,
    pub track_distance: bool,
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animation_duration: Duration::from_millis(300),
            station_animation_duration: Duration::ZERO,
            altitude_mode: AltitudeMode::default(),
            live_path: LivePathStyle::default(),
            route: RouteStyle::default(),
            track_distance: true,
            event_capacity: 256,
        }
    }
}

/// Notifications for presentation layers (legend, readouts, object lists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ObjectAdded { id: String, kind: TrackedKind },
    ObjectRemoved { id: String },
    Legend { object_id: String, range: ScalarRange },
    LegendCleared { object_id: String },
    Distance { object_id: String, reading: DistanceReading },
    /// Payload gimbal turned, by hand or to keep pointing at a station
    Payload { object_id: String, orientation: Orientation },
    Follow { id: Option<String> },
}

/// Summary of one tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObjectInfo {
    pub id: String,
    pub kind: TrackedKind,
    pub position: WorldPosition,
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointing_at: Option<String>,
    pub live_path_len: usize,
    pub route_len: usize,
}

pub struct TelemetryEngine<R: Renderer> {
    renderer: R,
    registry: EntityRegistry<Controller>,
    resolver: Arc<TerrainHeightResolver>,
    config: EngineConfig,
    events: broadcast::Sender<EngineEvent>,
    followed: Option<String>,
}

impl<R: Renderer> TelemetryEngine<R> {
    pub fn new(renderer: R, resolver: Arc<TerrainHeightResolver>, config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            renderer,
            registry: EntityRegistry::new(),
            resolver,
            config,
            events,
            followed: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn resolver(&self) -> &Arc<TerrainHeightResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn add_tracked_object(
        &mut self,
        id: &str,
        kind: TrackedKind,
        point: GeoPoint,
    ) -> Result<(), EngineError> {
        if self.registry.contains(id) {
            tracing::warn!(id, "tracked object already registered");
            return Err(EngineError::DuplicateId(id.to_string()));
        }

        let position = point.to_world();
        let model = self.renderer.create(Renderable::Model {
            object_id: id.to_string(),
            kind,
            position,
            orientation: Orientation::default(),
            payload: (kind == TrackedKind::Vehicle).then(Orientation::default),
        });
        let controller = match kind {
            TrackedKind::Vehicle => Controller::Vehicle(VehicleController::new(
                model,
                position,
                self.config.live_path,
                self.config.route,
            )),
            TrackedKind::Station => Controller::Station(StationController::new(model, position)),
        };
        self.registry.add(id, model, controller)?;

        tracing::info!(id, ?kind, lon = point.lon, lat = point.lat, alt = point.alt, "tracked object added");
        self.emit(EngineEvent::ObjectAdded {
            id: id.to_string(),
            kind,
        });
        Ok(())
    }

    /// Move an object to `point` and, for vehicles, record it on the live
    /// path and refresh the distance readout.
    pub fn update_position(
        &mut self,
        id: &str,
        point: GeoPoint,
        flight_path_enabled: bool,
        scalar: Option<f64>,
        now: Instant,
    ) -> Result<(), EngineError> {
        let Some(entry) = self.registry.find_mut(id) else {
            tracing::warn!(id, "position update for unknown object, skipping");
            return Err(EngineError::UnknownObject(id.to_string()));
        };

        let target = point.to_world();
        let duration = match entry.controller.kind() {
            TrackedKind::Vehicle => self.config.animation_duration,
            TrackedKind::Station => self.config.station_animation_duration,
        };
        entry.controller.move_to(target, duration, now);

        let Controller::Vehicle(vehicle) = &mut entry.controller else {
            return Ok(());
        };

        let mut pending = Vec::new();
        if flight_path_enabled {
            let scalar = scalar.filter(|value| value.is_finite());
            if let Some(range) = vehicle.record(&mut self.renderer, target, scalar) {
                pending.push(EngineEvent::Legend {
                    object_id: id.to_string(),
                    range,
                });
            }
        }
        if self.config.track_distance {
            if let Some(reading) = vehicle.track_distance(&mut self.renderer, target) {
                pending.push(EngineEvent::Distance {
                    object_id: id.to_string(),
                    reading,
                });
            }
        }

        for event in pending {
            self.emit(event);
        }
        Ok(())
    }

    /// Ground reference applied to route altitudes of `id`.
    fn route_ground_ref(&self, id: &str) -> Option<f64> {
        match self.config.altitude_mode {
            AltitudeMode::Absolute => Some(0.0),
            AltitudeMode::Continuous | AltitudeMode::GroundReference => self.resolver.ground_ref(id),
        }
    }

    /// Replace the planned route. Altitudes are relative to the object's
    /// ground reference.
    pub fn set_determined_route(
        &mut self,
        id: &str,
        lons: &[f64],
        lats: &[f64],
        alts: &[f64],
    ) -> Result<usize, EngineError> {
        let ground_ref = self.route_ground_ref(id);
        let track_distance = self.config.track_distance;
        let (count, reading) = self.with_vehicle(id, |vehicle, renderer| {
            let count = vehicle.set_route(renderer, id, lons, lats, alts, ground_ref)?;
            let live = vehicle.position();
            let reading = track_distance
                .then(|| vehicle.track_distance(renderer, live))
                .flatten();
            Ok((count, reading))
        })?;

        tracing::info!(id, waypoints = count, "determined route set");
        if let Some(reading) = reading {
            self.emit(EngineEvent::Distance {
                object_id: id.to_string(),
                reading,
            });
        }
        Ok(count)
    }

    pub fn remove_live_path(&mut self, id: &str) -> Result<(), EngineError> {
        self.with_vehicle(id, |vehicle, renderer| {
            vehicle.remove_live_path(renderer);
            Ok(())
        })
    }

    pub fn reset_live_path(&mut self, id: &str) -> Result<(), EngineError> {
        self.with_vehicle(id, |vehicle, renderer| {
            vehicle.reset_live_path(renderer);
            Ok(())
        })?;
        self.emit(EngineEvent::LegendCleared {
            object_id: id.to_string(),
        });
        Ok(())
    }

    pub fn remove_determined_route(&mut self, id: &str) -> Result<(), EngineError> {
        self.with_vehicle(id, |vehicle, renderer| {
            vehicle.remove_route(renderer);
            Ok(())
        })
    }

    /// Set the body (or antenna) heading, pitch and roll of any object.
    pub fn set_orientation(&mut self, id: &str, orientation: Orientation) -> Result<(), EngineError> {
        let Some(entry) = self.registry.find_mut(id) else {
            tracing::warn!(id, "orientation for unknown object, skipping");
            return Err(EngineError::UnknownObject(id.to_string()));
        };
        entry.controller.set_orientation(&mut self.renderer, orientation);
        tracing::debug!(id, heading = orientation.heading, pitch = orientation.pitch, "orientation set");
        Ok(())
    }

    /// Turn a vehicle's payload by Euler increments in degrees. Ends any
    /// station pointing.
    pub fn rotate_payload(
        &mut self,
        id: &str,
        yaw: f64,
        pitch: f64,
        roll: f64,
    ) -> Result<Orientation, EngineError> {
        let orientation = self.with_vehicle(id, |vehicle, renderer| {
            Ok(vehicle.rotate_payload(renderer, yaw, pitch, roll))
        })?;
        self.emit(EngineEvent::Payload {
            object_id: id.to_string(),
            orientation,
        });
        Ok(orientation)
    }

    /// Keep the payload of vehicle `id` aimed at `target`, drawing a pointing
    /// line between them. `None` stops pointing.
    pub fn point_payload_at(&mut self, id: &str, target: Option<&str>) -> Result<(), EngineError> {
        if let Some(target) = target {
            if target == id {
                tracing::warn!(id, "payload cannot point at its own vehicle");
                return Err(EngineError::SelfPointing(id.to_string()));
            }
            if !self.registry.contains(target) {
                tracing::warn!(id, target, "payload target unknown");
                return Err(EngineError::UnknownObject(target.to_string()));
            }
        }
        self.with_vehicle(id, |vehicle, renderer| {
            match target {
                Some(target) => vehicle.point_at(renderer, target),
                None => vehicle.stop_pointing(renderer),
            }
            Ok(())
        })?;
        tracing::info!(id, target = ?target, "payload pointing changed");
        self.aim_payloads();
        Ok(())
    }

    /// Re-aim every pointing payload whose vehicle or station moved.
    fn aim_payloads(&mut self) {
        let targets: Vec<(String, String)> = self
            .registry
            .iter()
            .filter_map(|entry| {
                let target = entry.controller.as_vehicle()?.pointing_at()?;
                Some((entry.id.clone(), target.to_string()))
            })
            .collect();

        for (id, target) in targets {
            let Some(station) = self.registry.find(&target).map(|entry| entry.controller.position())
            else {
                continue;
            };
            let Some(Controller::Vehicle(vehicle)) =
                self.registry.find_mut(&id).map(|entry| &mut entry.controller)
            else {
                continue;
            };
            if let Some(orientation) = vehicle.aim_payload(&mut self.renderer, station) {
                self.emit(EngineEvent::Payload {
                    object_id: id,
                    orientation,
                });
            }
        }
    }

    fn with_vehicle<T>(
        &mut self,
        id: &str,
        apply: impl FnOnce(&mut VehicleController, &mut R) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let result = match self.registry.find_mut(id) {
            Some(entry) => match entry.controller.vehicle_mut(id) {
                Ok(vehicle) => apply(vehicle, &mut self.renderer),
                Err(err) => Err(err),
            },
            None => Err(EngineError::UnknownObject(id.to_string())),
        };
        if let Err(err) = &result {
            tracing::warn!(id, "vehicle operation skipped: {}", err);
        }
        result
    }

    /// Tear down everything drawn for `id` and forget it, including its
    /// ground reference.
    pub fn remove_tracked_object(&mut self, id: &str) -> Result<(), EngineError> {
        let Some(mut entry) = self.registry.remove(id) else {
            tracing::debug!(id, "remove for unknown object");
            return Err(EngineError::UnknownObject(id.to_string()));
        };

        if self.followed.as_deref() == Some(id) {
            self.renderer.follow(None);
            self.followed = None;
            self.emit(EngineEvent::Follow { id: None });
        }
        entry.controller.teardown(&mut self.renderer);
        self.resolver.clear_ground_ref(id);
        for other in self.registry.iter_mut() {
            if let Controller::Vehicle(vehicle) = &mut other.controller {
                if vehicle.pointing_at() == Some(id) {
                    vehicle.stop_pointing(&mut self.renderer);
                }
            }
        }

        tracing::info!(id, "tracked object removed");
        self.emit(EngineEvent::ObjectRemoved { id: id.to_string() });
        Ok(())
    }

    /// Attach the camera to `id`, or detach it with `None`.
    pub fn follow(&mut self, id: Option<&str>) -> Result<(), EngineError> {
        let handle = match id {
            Some(id) => match self.registry.find(id) {
                Some(entry) => Some(entry.handle),
                None => {
                    tracing::warn!(id, "cannot follow unknown object");
                    return Err(EngineError::UnknownObject(id.to_string()));
                }
            },
            None => None,
        };
        self.renderer.follow(handle);
        self.followed = id.map(str::to_string);
        self.emit(EngineEvent::Follow {
            id: self.followed.clone(),
        });
        Ok(())
    }

    pub fn followed(&self) -> Option<&str> {
        self.followed.as_deref()
    }

    /// Advance every running animation. Returns how many objects moved.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut moved = 0;
        for entry in self.registry.iter_mut() {
            if entry.controller.tick(&mut self.renderer, now) {
                moved += 1;
            }
        }
        if moved > 0 {
            self.aim_payloads();
        }
        moved
    }

    pub fn snapshot_ids(&self) -> Vec<String> {
        self.registry.list()
    }

    pub fn objects(&self) -> Vec<TrackedObjectInfo> {
        self.registry
            .list()
            .into_iter()
            .filter_map(|id| {
                let entry = self.registry.find(&id)?;
                let vehicle = entry.controller.as_vehicle();
                Some(TrackedObjectInfo {
                    kind: entry.controller.kind(),
                    position: entry.controller.position(),
                    orientation: entry.controller.orientation(),
                    payload: vehicle.map(VehicleController::payload),
                    pointing_at: vehicle.and_then(|v| v.pointing_at()).map(str::to_string),
                    live_path_len: vehicle.map(|v| v.live_path().len()).unwrap_or(0),
                    route_len: vehicle.map(|v| v.route().waypoints().len()).unwrap_or(0),
                    id,
                })
            })
            .collect()
    }

    pub fn object(&self, id: &str) -> Option<&Controller> {
        self.registry.find(id).map(|entry| &entry.controller)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Remove every tracked object.
    pub fn clear(&mut self) {
        for id in self.registry.list() {
            let _ = self.remove_tracked_object(&id);
        }
    }

    /// Drop the engine and hand back the renderer.
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemoryScene;
    use crate::terrain::FlatElevation;

    fn engine() -> TelemetryEngine<MemoryScene> {
        let resolver = Arc::new(TerrainHeightResolver::new(FlatElevation(0.0)));
        TelemetryEngine::new(MemoryScene::new(), resolver, EngineConfig::default())
    }

    #[test]
    fn duplicate_add_creates_nothing() {
        let mut engine = engine();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        let err = engine
            .add_tracked_object("d1", TrackedKind::Station, GeoPoint::new(0.0, 0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateId("d1".into()));
        assert_eq!(engine.renderer().len(), 1);
        assert_eq!(engine.objects()[0].kind, TrackedKind::Vehicle);
    }

    #[test]
    fn unknown_object_operations_fail_without_side_effects() {
        let mut engine = engine();
        let now = Instant::now();
        let unknown = EngineError::UnknownObject("ghost".into());

        assert_eq!(
            engine.update_position("ghost", GeoPoint::new(0.0, 0.0, 0.0), true, Some(1.0), now),
            Err(unknown.clone())
        );
        assert_eq!(engine.remove_live_path("ghost"), Err(unknown.clone()));
        assert_eq!(engine.remove_determined_route("ghost"), Err(unknown.clone()));
        assert_eq!(engine.remove_tracked_object("ghost"), Err(unknown.clone()));
        assert_eq!(engine.follow(Some("ghost")), Err(unknown));
        assert!(engine.renderer().is_empty());
    }

    #[tokio::test]
    async fn route_needs_ground_reference() {
        let mut engine = engine();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();

        let err = engine.set_determined_route("d1", &[10.0], &[55.0], &[50.0]).unwrap_err();
        assert_eq!(err, EngineError::NoGroundReference("d1".into()));

        engine.resolver().set_ground_ref("d1", 10.0, 55.0).await;
        assert_eq!(engine.set_determined_route("d1", &[10.0], &[55.0], &[50.0]), Ok(1));
    }

    #[test]
    fn absolute_mode_routes_without_ground_reference() {
        let resolver = Arc::new(TerrainHeightResolver::new(FlatElevation(0.0)));
        let config = EngineConfig {
            altitude_mode: AltitudeMode::Absolute,
            ..EngineConfig::default()
        };
        let mut engine = TelemetryEngine::new(MemoryScene::new(), resolver, config);
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        assert_eq!(engine.set_determined_route("d1", &[10.0, 10.1], &[55.0, 55.1], &[1.0, 2.0]), Ok(2));
    }

    #[test]
    fn station_updates_skip_paths() {
        let mut engine = engine();
        let now = Instant::now();
        engine.add_tracked_object("gs", TrackedKind::Station, GeoPoint::new(10.0, 55.0, 0.0)).unwrap();

        engine
            .update_position("gs", GeoPoint::new(10.1, 55.0, 0.0), true, Some(5.0), now)
            .unwrap();
        engine
            .update_position("gs", GeoPoint::new(10.2, 55.0, 0.0), true, Some(6.0), now)
            .unwrap();
        assert_eq!(engine.tick(now), 1);
        assert_eq!(engine.renderer().len(), 1);
        assert_eq!(
            engine.object("gs").unwrap().position(),
            GeoPoint::new(10.2, 55.0, 0.0).to_world()
        );
        assert_eq!(
            engine.reset_live_path("gs"),
            Err(EngineError::UnsupportedForStation("gs".into()))
        );
    }

    #[test]
    fn follow_is_detached_when_object_removed() {
        let mut engine = engine();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        engine.follow(Some("d1")).unwrap();
        assert!(engine.renderer().followed().is_some());

        engine.remove_tracked_object("d1").unwrap();
        assert_eq!(engine.followed(), None);
        assert_eq!(engine.renderer().followed(), None);
        assert!(engine.renderer().is_empty());
    }

    #[test]
    fn events_are_broadcast() {
        let mut engine = engine();
        let mut events = engine.subscribe();
        let now = Instant::now();

        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        engine
            .update_position("d1", GeoPoint::new(10.0, 55.0, 101.0), true, Some(7.0), now)
            .unwrap();
        engine.clear();

        assert_eq!(
            events.try_recv().unwrap(),
            EngineEvent::ObjectAdded {
                id: "d1".into(),
                kind: TrackedKind::Vehicle
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            EngineEvent::Legend {
                object_id: "d1".into(),
                range: ScalarRange { min: 7.0, max: 7.0 },
            }
        );
        assert_eq!(events.try_recv().unwrap(), EngineEvent::ObjectRemoved { id: "d1".into() });
        assert!(engine.is_empty());
    }

    #[test]
    fn non_finite_scalar_is_neutral() {
        let mut engine = engine();
        let now = Instant::now();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        engine
            .update_position("d1", GeoPoint::new(10.0, 55.0, 101.0), true, Some(f64::NAN), now)
            .unwrap();

        let Some(Controller::Vehicle(vehicle)) = engine.object("d1") else {
            panic!("expected vehicle");
        };
        assert!(vehicle.live_path().range().is_empty());
        assert_eq!(vehicle.live_path().colors(), &[crate::models::Color::WHITE]);
    }

    #[test]
    fn payload_follows_station_on_tick() {
        let mut engine = engine();
        let mut events = engine.subscribe();
        let t0 = Instant::now();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        engine.add_tracked_object("gs", TrackedKind::Station, GeoPoint::new(10.001, 55.0, 100.0)).unwrap();
        engine.point_payload_at("d1", Some("gs")).unwrap();

        // two models + pointing line
        assert_eq!(engine.renderer().len(), 3);
        let info = &engine.objects()[0];
        assert_eq!(info.pointing_at.as_deref(), Some("gs"));
        assert!((info.payload.unwrap().heading - 90.0).abs() < 0.01);

        // station snaps north of the vehicle on the next frame
        engine
            .update_position("gs", GeoPoint::new(10.0, 55.001, 100.0), false, None, t0)
            .unwrap();
        assert_eq!(engine.tick(t0), 1);
        let payload = engine.objects()[0].payload.unwrap();
        assert!(payload.heading < 0.01 || payload.heading > 359.99, "{}", payload.heading);
        assert_eq!(engine.renderer().len(), 3);

        let payload_events: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|event| matches!(event, EngineEvent::Payload { .. }))
            .collect();
        assert_eq!(payload_events.len(), 2);

        // removing the station drops the line and the pointing
        engine.remove_tracked_object("gs").unwrap();
        assert_eq!(engine.renderer().len(), 1);
        assert_eq!(engine.objects()[0].pointing_at, None);
    }

    #[test]
    fn pointing_rejects_bad_targets() {
        let mut engine = engine();
        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        engine.add_tracked_object("gs", TrackedKind::Station, GeoPoint::new(10.001, 55.0, 0.0)).unwrap();

        assert_eq!(
            engine.point_payload_at("d1", Some("d1")),
            Err(EngineError::SelfPointing("d1".into()))
        );
        assert_eq!(
            engine.point_payload_at("d1", Some("ghost")),
            Err(EngineError::UnknownObject("ghost".into()))
        );
        assert_eq!(
            engine.point_payload_at("gs", Some("d1")),
            Err(EngineError::UnsupportedForStation("gs".into()))
        );
        assert_eq!(
            engine.rotate_payload("gs", 1.0, 0.0, 0.0),
            Err(EngineError::UnsupportedForStation("gs".into()))
        );
        assert_eq!(engine.renderer().len(), 2);
    }

    #[test]
    fn orientation_applies_to_any_kind() {
        let mut engine = engine();
        engine.add_tracked_object("gs", TrackedKind::Station, GeoPoint::new(10.0, 55.0, 0.0)).unwrap();
        let antenna = Orientation::new(120.0, 15.0, 0.0);

        engine.set_orientation("gs", antenna).unwrap();
        let info = &engine.objects()[0];
        assert_eq!(info.orientation, antenna);
        assert_eq!(info.payload, None);
        assert_eq!(
            engine.set_orientation("ghost", antenna),
            Err(EngineError::UnknownObject("ghost".into()))
        );

        engine.add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 100.0)).unwrap();
        let payload = engine.rotate_payload("d1", -90.0, -30.0, 0.0).unwrap();
        assert_eq!(payload, Orientation::new(270.0, -30.0, 0.0));
    }
}
