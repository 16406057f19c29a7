//! Distance from the live position to the nearest planned waypoint.

use serde::{Deserialize, Serialize};

use crate::models::Color;
use crate::render::{PolylineColors, RenderHandle, Renderable, Renderer};
use crate::spatial::WorldPosition;

/// Nearest waypoint of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestWaypoint {
    pub index: usize,
    pub position: WorldPosition,
    pub distance_m: f64,
}

/// Result of one distance update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceReading {
    pub nearest: NearestWaypoint,
    pub label: String,
}

/// Nearest neighbor over the discrete waypoints (not a segment projection).
/// The first of equally distant waypoints wins.
pub fn nearest_waypoint(waypoints: &[WorldPosition], live: &WorldPosition) -> Option<NearestWaypoint> {
    let mut best: Option<NearestWaypoint> = None;
    for (index, waypoint) in waypoints.iter().enumerate() {
        let distance_m = live.distance_to(waypoint);
        let replace = best.map(|current| distance_m < current.distance_m).unwrap_or(true);
        if replace {
            best = Some(NearestWaypoint {
                index,
                position: *waypoint,
                distance_m,
            });
        }
    }
    best
}

pub fn format_distance(meters: f64) -> String {
    format!("{:.2} m", meters)
}

/// One connector line plus one label. The line is rebuilt each update; the
/// label is created once and then edited in place.
#[derive(Debug)]
pub struct DistanceTracker {
    line_color: Color,
    line_width: f32,
    line: Option<RenderHandle>,
    label: Option<RenderHandle>,
}

impl Default for DistanceTracker {
    fn default() -> Self {
        Self {
            line_color: Color::YELLOW,
            line_width: 2.0,
            line: None,
            label: None,
        }
    }
}

impl DistanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        renderer: &mut impl Renderer,
        live: WorldPosition,
        waypoints: &[WorldPosition],
    ) -> Option<DistanceReading> {
        let nearest = nearest_waypoint(waypoints, &live)?;

        if let Some(line) = self.line.take() {
            renderer.destroy(line);
        }
        self.line = Some(renderer.create(Renderable::Polyline {
            positions: vec![live, nearest.position],
            colors: PolylineColors::Uniform(self.line_color),
            width: self.line_width,
            translucent: false,
        }));

        let text = format_distance(nearest.distance_m);
        let midpoint = live.midpoint(&nearest.position);
        match self.label {
            Some(label) => renderer.update_label(label, midpoint, &text),
            None => {
                self.label = Some(renderer.create(Renderable::Label {
                    position: midpoint,
                    text: text.clone(),
                }));
            }
        }

        Some(DistanceReading { nearest, label: text })
    }

    pub fn clear(&mut self, renderer: &mut impl Renderer) {
        for handle in [self.line.take(), self.label.take()].into_iter().flatten() {
            renderer.destroy(handle);
        }
    }

    pub fn label_handle(&self) -> Option<RenderHandle> {
        self.label
    }
}
