//! Precomputed route with start/end markers, replaced wholesale on update.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Color;
use crate::render::{PolylineColors, RenderHandle, Renderable, Renderer};
use crate::spatial::WorldPosition;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    pub line_color: Color,
    pub line_width: f32,
    pub start_color: Color,
    pub end_color: Color,
    pub marker_size: f32,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            line_color: Color::ORANGE.with_alpha(0.4),
            line_width: 1.0,
            start_color: Color::GREEN,
            end_color: Color::RED,
            marker_size: 10.0,
        }
    }
}

#[derive(Debug, Default)]
struct RouteHandles {
    line: Option<RenderHandle>,
    start: Option<RenderHandle>,
    end: Option<RenderHandle>,
}

impl RouteHandles {
    fn destroy(&mut self, renderer: &mut impl Renderer) {
        for handle in [self.line.take(), self.start.take(), self.end.take()].into_iter().flatten() {
            renderer.destroy(handle);
        }
    }
}

/// Planned route of one vehicle.
#[derive(Debug, Default)]
pub struct DeterminedPathRenderer {
    style: RouteStyle,
    waypoints: Vec<WorldPosition>,
    handles: RouteHandles,
}

impl DeterminedPathRenderer {
    pub fn new(style: RouteStyle) -> Self {
        Self {
            style,
            waypoints: Vec::new(),
            handles: RouteHandles::default(),
        }
    }

    /// Replace the route. Altitudes are relative to `ground_ref`.
    ///
    /// On any validation failure the current route stays as it is.
    pub fn set_route(
        &mut self,
        renderer: &mut impl Renderer,
        lons: &[f64],
        lats: &[f64],
        alts: &[f64],
        ground_ref: Option<f64>,
    ) -> Result<usize, RouteRejection> {
        if lons.len() != lats.len() || lats.len() != alts.len() {
            return Err(RouteRejection::LengthMismatch {
                lons: lons.len(),
                lats: lats.len(),
                alts: alts.len(),
            });
        }
        if lons.is_empty() {
            return Err(RouteRejection::Empty);
        }
        let Some(ground_ref) = ground_ref else {
            return Err(RouteRejection::NoGroundReference);
        };

        let waypoints: Vec<WorldPosition> = lons
            .iter()
            .zip(lats)
            .zip(alts)
            .map(|((lon, lat), alt)| WorldPosition::from_degrees(*lon, *lat, alt + ground_ref))
            .collect();

        self.handles.destroy(renderer);

        let (first, last) = (waypoints[0], waypoints[waypoints.len() - 1]);
        self.handles.line = Some(renderer.create(Renderable::Polyline {
            positions: waypoints.clone(),
            colors: PolylineColors::Uniform(self.style.line_color),
            width: self.style.line_width,
            translucent: true,
        }));
        self.handles.start = Some(renderer.create(Renderable::Point {
            position: first,
            color: self.style.start_color,
            pixel_size: self.style.marker_size,
        }));
        self.handles.end = Some(renderer.create(Renderable::Point {
            position: last,
            color: self.style.end_color,
            pixel_size: self.style.marker_size,
        }));

        self.waypoints = waypoints;
        Ok(self.waypoints.len())
    }

    /// Tear down line and markers and forget the waypoints.
    pub fn remove(&mut self, renderer: &mut impl Renderer) {
        self.handles.destroy(renderer);
        self.waypoints.clear();
    }

    pub fn waypoints(&self) -> &[WorldPosition] {
        &self.waypoints
    }

    pub fn is_set(&self) -> bool {
        !self.waypoints.is_empty()
    }
}

/// Why a route update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRejection {
    LengthMismatch { lons: usize, lats: usize, alts: usize },
    Empty,
    NoGroundReference,
}

impl RouteRejection {
    pub fn into_error(self, object_id: &str) -> EngineError {
        match self {
            Self::LengthMismatch { lons, lats, alts } => {
                EngineError::RouteLengthMismatch { lons, lats, alts }
            }
            Self::Empty => EngineError::EmptyRoute,
            Self::NoGroundReference => EngineError::NoGroundReference(object_id.to_string()),
        }
    }
}
