//! Per-object orchestration of animator, pose, live path, route and distance.

use std::time::Duration;
use tokio::time::Instant;

use crate::animator::PositionAnimator;
use crate::determined_route::{DeterminedPathRenderer, RouteStyle};
use crate::distance::{DistanceReading, DistanceTracker};
use crate::error::EngineError;
use crate::live_path::{LivePathRenderer, LivePathStyle};
use crate::models::{Orientation, ScalarRange, TrackedKind};
use crate::pointing::PointingLine;
use crate::render::{RenderHandle, Renderer};
use crate::spatial::WorldPosition;

/// Drives one aerial vehicle.
#[derive(Debug)]
pub struct VehicleController {
    model: RenderHandle,
    position: WorldPosition,
    animator: PositionAnimator,
    orientation: Orientation,
    payload: Orientation,
    pointing: Option<PointingLine>,
    live_path: LivePathRenderer,
    route: DeterminedPathRenderer,
    distance: DistanceTracker,
}

impl VehicleController {
    pub fn new(
        model: RenderHandle,
        position: WorldPosition,
        live_style: LivePathStyle,
        route_style: RouteStyle,
    ) -> Self {
        Self {
            model,
            position,
            animator: PositionAnimator::new(),
            orientation: Orientation::default(),
            payload: Orientation::default(),
            pointing: None,
            live_path: LivePathRenderer::new(live_style),
            route: DeterminedPathRenderer::new(route_style),
            distance: DistanceTracker::new(),
        }
    }

    pub fn move_to(&mut self, target: WorldPosition, duration: Duration, now: Instant) -> bool {
        self.animator.animate_to(Some(self.position), target, duration, now)
    }

    pub fn tick(&mut self, renderer: &mut impl Renderer, now: Instant) -> bool {
        advance(&mut self.animator, &mut self.position, self.model, renderer, now)
    }

    /// Append a live-path sample. Returns the scalar range when it moved.
    pub fn record(
        &mut self,
        renderer: &mut impl Renderer,
        target: WorldPosition,
        scalar: Option<f64>,
    ) -> Option<ScalarRange> {
        self.live_path.append(renderer, target, scalar)
    }

    pub fn set_route(
        &mut self,
        renderer: &mut impl Renderer,
        object_id: &str,
        lons: &[f64],
        lats: &[f64],
        alts: &[f64],
        ground_ref: Option<f64>,
    ) -> Result<usize, EngineError> {
        self.route
            .set_route(renderer, lons, lats, alts, ground_ref)
            .map_err(|rejection| rejection.into_error(object_id))
    }

    pub fn remove_route(&mut self, renderer: &mut impl Renderer) {
        self.route.remove(renderer);
        self.distance.clear(renderer);
    }

    pub fn remove_live_path(&mut self, renderer: &mut impl Renderer) {
        self.live_path.remove(renderer);
    }

    pub fn reset_live_path(&mut self, renderer: &mut impl Renderer) {
        self.live_path.reset(renderer);
    }

    pub fn set_orientation(&mut self, renderer: &mut impl Renderer, orientation: Orientation) {
        self.orientation = orientation;
        renderer.update_orientation(self.model, orientation);
    }

    /// Turn the payload by Euler increments. Manual control ends any pointing.
    pub fn rotate_payload(
        &mut self,
        renderer: &mut impl Renderer,
        yaw: f64,
        pitch: f64,
        roll: f64,
    ) -> Orientation {
        self.stop_pointing(renderer);
        self.payload = self.payload.rotated(yaw, pitch, roll);
        renderer.update_payload(self.model, self.payload);
        self.payload
    }

    /// Keep the payload aimed at `station_id` from the next [`Self::aim_payload`].
    pub fn point_at(&mut self, renderer: &mut impl Renderer, station_id: impl Into<String>) {
        self.stop_pointing(renderer);
        self.pointing = Some(PointingLine::new(station_id));
    }

    pub fn stop_pointing(&mut self, renderer: &mut impl Renderer) {
        if let Some(mut pointing) = self.pointing.take() {
            pointing.clear(renderer);
        }
    }

    pub fn pointing_at(&self) -> Option<&str> {
        self.pointing.as_ref().map(PointingLine::station_id)
    }

    /// Re-aim at the pointed station. Returns the new payload orientation when
    /// it changed.
    pub fn aim_payload(
        &mut self,
        renderer: &mut impl Renderer,
        station: WorldPosition,
    ) -> Option<Orientation> {
        let pointing = self.pointing.as_mut()?;
        let aim = pointing.update(renderer, self.position, station, self.payload)?;
        self.payload = aim;
        renderer.update_payload(self.model, aim);
        Some(aim)
    }

    /// Refresh the distance readout against the current route. `None` when no
    /// route is set.
    pub fn track_distance(
        &mut self,
        renderer: &mut impl Renderer,
        live: WorldPosition,
    ) -> Option<DistanceReading> {
        self.distance.update(renderer, live, self.route.waypoints())
    }

    pub fn teardown(&mut self, renderer: &mut impl Renderer) {
        self.animator.cancel();
        self.stop_pointing(renderer);
        self.live_path.remove(renderer);
        self.route.remove(renderer);
        self.distance.clear(renderer);
        renderer.destroy(self.model);
    }

    pub fn position(&self) -> WorldPosition {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn payload(&self) -> Orientation {
        self.payload
    }

    pub fn live_path(&self) -> &LivePathRenderer {
        &self.live_path
    }

    pub fn route(&self) -> &DeterminedPathRenderer {
        &self.route
    }
}

/// Drives one fixed ground station. Stations move (usually by snapping) but
/// carry no paths.
#[derive(Debug)]
pub struct StationController {
    model: RenderHandle,
    position: WorldPosition,
    animator: PositionAnimator,
    orientation: Orientation,
}

impl StationController {
    pub fn new(model: RenderHandle, position: WorldPosition) -> Self {
        Self {
            model,
            position,
            animator: PositionAnimator::new(),
            orientation: Orientation::default(),
        }
    }

    pub fn move_to(&mut self, target: WorldPosition, duration: Duration, now: Instant) -> bool {
        self.animator.animate_to(Some(self.position), target, duration, now)
    }

    pub fn tick(&mut self, renderer: &mut impl Renderer, now: Instant) -> bool {
        advance(&mut self.animator, &mut self.position, self.model, renderer, now)
    }

    pub fn teardown(&mut self, renderer: &mut impl Renderer) {
        self.animator.cancel();
        renderer.destroy(self.model);
    }

    /// Antenna heading, pitch and roll.
    pub fn set_orientation(&mut self, renderer: &mut impl Renderer, orientation: Orientation) {
        self.orientation = orientation;
        renderer.update_orientation(self.model, orientation);
    }

    pub fn position(&self) -> WorldPosition {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

fn advance(
    animator: &mut PositionAnimator,
    position: &mut WorldPosition,
    model: RenderHandle,
    renderer: &mut impl Renderer,
    now: Instant,
) -> bool {
    match animator.tick(now) {
        Some(next) => {
            *position = next;
            renderer.update_position(model, next);
            true
        }
        None => false,
    }
}

#[derive(Debug)]
pub enum Controller {
    Vehicle(VehicleController),
    Station(StationController),
}

impl Controller {
    pub fn kind(&self) -> TrackedKind {
        match self {
            Self::Vehicle(_) => TrackedKind::Vehicle,
            Self::Station(_) => TrackedKind::Station,
        }
    }

    pub fn position(&self) -> WorldPosition {
        match self {
            Self::Vehicle(vehicle) => vehicle.position(),
            Self::Station(station) => station.position(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Vehicle(vehicle) => vehicle.orientation(),
            Self::Station(station) => station.orientation(),
        }
    }

    pub fn set_orientation(&mut self, renderer: &mut impl Renderer, orientation: Orientation) {
        match self {
            Self::Vehicle(vehicle) => vehicle.set_orientation(renderer, orientation),
            Self::Station(station) => station.set_orientation(renderer, orientation),
        }
    }

    pub fn move_to(&mut self, target: WorldPosition, duration: Duration, now: Instant) -> bool {
        match self {
            Self::Vehicle(vehicle) => vehicle.move_to(target, duration, now),
            Self::Station(station) => station.move_to(target, duration, now),
        }
    }

    pub fn tick(&mut self, renderer: &mut impl Renderer, now: Instant) -> bool {
        match self {
            Self::Vehicle(vehicle) => vehicle.tick(renderer, now),
            Self::Station(station) => station.tick(renderer, now),
        }
    }

    pub fn teardown(&mut self, renderer: &mut impl Renderer) {
        match self {
            Self::Vehicle(vehicle) => vehicle.teardown(renderer),
            Self::Station(station) => station.teardown(renderer),
        }
    }

    pub fn as_vehicle(&self) -> Option<&VehicleController> {
        match self {
            Self::Vehicle(vehicle) => Some(vehicle),
            Self::Station(_) => None,
        }
    }

    /// Path operations are vehicle-only.
    pub fn vehicle_mut(&mut self, object_id: &str) -> Result<&mut VehicleController, EngineError> {
        match self {
            Self::Vehicle(vehicle) => Ok(vehicle),
            Self::Station(_) => Err(EngineError::UnsupportedForStation(object_id.to_string())),
        }
    }
}
