//! Append-only live path colored by a telemetry scalar.

use serde::{Deserialize, Serialize};

use crate::models::{Color, ScalarRange, TelemetrySample};
use crate::render::{PolylineColors, RenderHandle, Renderable, Renderer};
use crate::spatial::WorldPosition;

/// Reserved scalar meaning "no reading"; always drawn with the neutral color.
pub const SCALAR_SENTINEL: f64 = -9999.0;

/// Two-color hue ramp used to color the live path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    /// Hue (degrees) of the range minimum
    pub low_hue: f32,
    /// Hue (degrees) of the range maximum
    pub high_hue: f32,
    /// Color for samples without a usable scalar
    pub neutral: Color,
    pub sentinel: f64,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            low_hue: 240.0,
            high_hue: 0.0,
            neutral: Color::WHITE,
            sentinel: SCALAR_SENTINEL,
        }
    }
}

impl ColorRamp {
    /// Hue for a normalized value in `[0, 1]`.
    pub fn hue_at(&self, normalized: f64) -> f32 {
        let t = normalized.clamp(0.0, 1.0) as f32;
        self.low_hue + (self.high_hue - self.low_hue) * t
    }

    pub fn color_for(&self, scalar: Option<f64>, range: &ScalarRange) -> Color {
        match scalar {
            Some(value) if self.is_usable(value) => {
                Color::from_hsv(self.hue_at(range.normalize(value)), 1.0, 1.0)
            }
            _ => self.neutral,
        }
    }

    fn is_usable(&self, value: f64) -> bool {
        value.is_finite() && value != self.sentinel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivePathStyle {
    pub width: f32,
    pub ramp: ColorRamp,
}

impl Default for LivePathStyle {
    fn default() -> Self {
        Self {
            width: 3.5,
            ramp: ColorRamp::default(),
        }
    }
}

/// Growing path of one vehicle. The polyline is rebuilt from scratch on
/// every change.
#[derive(Debug)]
pub struct LivePathRenderer {
    style: LivePathStyle,
    positions: Vec<WorldPosition>,
    colors: Vec<Color>,
    scalars: Vec<Option<f64>>,
    range: ScalarRange,
    handle: Option<RenderHandle>,
}

impl LivePathRenderer {
    pub fn new(style: LivePathStyle) -> Self {
        Self {
            style,
            positions: Vec::new(),
            colors: Vec::new(),
            scalars: Vec::new(),
            range: ScalarRange::EMPTY,
            handle: None,
        }
    }

    /// Append one sample. Returns the new scalar range when it changed so the
    /// caller can refresh the legend.
    pub fn append(
        &mut self,
        renderer: &mut impl Renderer,
        position: WorldPosition,
        scalar: Option<f64>,
    ) -> Option<ScalarRange> {
        let ramp = self.style.ramp;
        let usable = scalar.filter(|value| ramp.is_usable(*value));
        let mut range_changed = false;

        self.scalars.push(scalar);
        match usable {
            Some(value) => {
                range_changed = self.range.include(value);
                // Earlier points were colored under a stale range
                self.colors = self
                    .scalars
                    .iter()
                    .map(|sample| ramp.color_for(*sample, &self.range))
                    .collect();
            }
            None => self.colors.push(ramp.neutral),
        }
        self.positions.push(position);

        if self.positions.len() >= 2 {
            self.rebuild(renderer);
        }

        range_changed.then_some(self.range)
    }

    fn rebuild(&mut self, renderer: &mut impl Renderer) {
        if let Some(handle) = self.handle.take() {
            renderer.destroy(handle);
        }
        self.handle = Some(renderer.create(Renderable::Polyline {
            positions: self.positions.clone(),
            colors: PolylineColors::PerVertex(self.colors.clone()),
            width: self.style.width,
            translucent: false,
        }));
    }

    /// Clear history and remove the polyline.
    pub fn reset(&mut self, renderer: &mut impl Renderer) {
        self.remove(renderer);
        self.positions.clear();
        self.colors.clear();
        self.scalars.clear();
        self.range = ScalarRange::EMPTY;
    }

    /// Remove the polyline but keep history.
    pub fn remove(&mut self, renderer: &mut impl Renderer) {
        if let Some(handle) = self.handle.take() {
            renderer.destroy(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn range(&self) -> ScalarRange {
        self.range
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn samples(&self) -> impl Iterator<Item = TelemetrySample> + '_ {
        self.positions
            .iter()
            .zip(&self.scalars)
            .zip(&self.colors)
            .map(|((position, scalar), color)| TelemetrySample {
                position: *position,
                scalar: *scalar,
                color: *color,
            })
    }
}
