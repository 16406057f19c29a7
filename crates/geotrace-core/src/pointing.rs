//! Payload pointing: a vehicle's payload kept aimed at a ground station,
//! drawn as a line between the two.

use crate::models::{Color, Orientation};
use crate::render::{PolylineColors, RenderHandle, Renderable, Renderer};
use crate::spatial::WorldPosition;

/// Payload headings closer than this are not re-sent to the Scene.
const ORIENTATION_EPSILON_DEG: f64 = 1e-6;

#[derive(Debug)]
pub struct PointingLine {
    station_id: String,
    color: Color,
    width: f32,
    line: Option<RenderHandle>,
    ends: Option<(WorldPosition, WorldPosition)>,
}

impl PointingLine {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            color: Color::RED,
            width: 2.0,
            line: None,
            ends: None,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        self.line
    }

    /// Redraw the line if either end moved. Returns the payload orientation
    /// aiming from `vehicle` at `station`, or `None` when nothing changed or
    /// the two coincide.
    pub fn update(
        &mut self,
        renderer: &mut impl Renderer,
        vehicle: WorldPosition,
        station: WorldPosition,
        current: Orientation,
    ) -> Option<Orientation> {
        if self.ends == Some((vehicle, station)) {
            return None;
        }
        self.ends = Some((vehicle, station));

        if let Some(line) = self.line.take() {
            renderer.destroy(line);
        }
        self.line = Some(renderer.create(Renderable::Polyline {
            positions: vec![vehicle, station],
            colors: PolylineColors::Uniform(self.color),
            width: self.width,
            translucent: false,
        }));

        Orientation::facing(&vehicle, &station)
            .filter(|aim| aim.max_delta(&current) > ORIENTATION_EPSILON_DEG)
    }

    pub fn clear(&mut self, renderer: &mut impl Renderer) {
        if let Some(line) = self.line.take() {
            renderer.destroy(line);
        }
        self.ends = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::render::MemoryScene;

    #[test]
    fn line_is_rebuilt_only_when_an_end_moves() {
        let mut scene = MemoryScene::new();
        let mut pointing = PointingLine::new("gs");
        let vehicle = GeoPoint::new(10.0, 55.0, 100.0).to_world();
        let station = GeoPoint::new(10.0, 55.001, 0.0).to_world();

        let aim = pointing
            .update(&mut scene, vehicle, station, Orientation::default())
            .unwrap();
        assert!(aim.heading < 0.01 || aim.heading > 359.99);
        assert!(aim.pitch < -40.0 && aim.pitch > -50.0, "{}", aim.pitch);
        let first = pointing.handle().unwrap();

        assert!(pointing.update(&mut scene, vehicle, station, aim).is_none());
        assert_eq!(pointing.handle(), Some(first));
        assert_eq!(scene.len(), 1);

        let moved = GeoPoint::new(10.001, 55.0, 100.0).to_world();
        let aim = pointing.update(&mut scene, moved, station, aim).unwrap();
        assert!(aim.heading > 270.0 && aim.heading < 360.0);
        assert_ne!(pointing.handle(), Some(first));
        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.get(pointing.handle().unwrap()),
            Some(&Renderable::Polyline {
                positions: vec![moved, station],
                colors: PolylineColors::Uniform(Color::RED),
                width: 2.0,
                translucent: false,
            })
        );

        pointing.clear(&mut scene);
        assert!(scene.is_empty());
    }

    #[test]
    fn unchanged_aim_is_not_reported() {
        let mut scene = MemoryScene::new();
        let mut pointing = PointingLine::new("gs");
        let vehicle = GeoPoint::new(10.0, 55.0, 100.0).to_world();
        let station = GeoPoint::new(10.001, 55.0, 100.0).to_world();
        let aim = Orientation::facing(&vehicle, &station).unwrap();

        // line drawn, but the payload already looks that way
        assert!(pointing.update(&mut scene, vehicle, station, aim).is_none());
        assert_eq!(scene.len(), 1);
    }
}
