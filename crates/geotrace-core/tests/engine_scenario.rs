//! End-to-end engine scenarios against the in-memory scene.
//!
//! Run with: cargo test -p geotrace-core --test engine_scenario

use geotrace_core::{
    AltitudeMode, Color, Controller, EngineConfig, EngineEvent, FlatElevation, GeoPoint,
    MemoryScene, PolylineColors, Renderable, TelemetryEngine, TerrainHeightResolver, TrackedKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn engine_with_flat_ground(height: f64) -> TelemetryEngine<MemoryScene> {
    let resolver = Arc::new(TerrainHeightResolver::new(FlatElevation(height)));
    TelemetryEngine::new(MemoryScene::new(), resolver, EngineConfig::default())
}

fn count_points(scene: &MemoryScene, color: Color) -> usize {
    scene.count_where(|r| matches!(r, Renderable::Point { color: c, .. } if *c == color))
}

#[tokio::test]
async fn add_route_and_update_scenario() {
    let mut engine = engine_with_flat_ground(0.0);
    let mut events = engine.subscribe();

    let start = GeoPoint::new(10.0, 55.0, 100.0);
    engine.add_tracked_object("d1", TrackedKind::Vehicle, start).unwrap();
    let ground_ref = engine.resolver().set_ground_ref("d1", start.lon, start.lat).await;
    assert_eq!(ground_ref, 0.0);

    let count = engine
        .set_determined_route("d1", &[10.0, 10.001], &[55.0, 55.001], &[50.0, 55.0])
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(count_points(engine.renderer(), Color::GREEN), 1);
    assert_eq!(count_points(engine.renderer(), Color::RED), 1);

    let t0 = Instant::now();
    let target = GeoPoint::new(10.0005, 55.0005, 52.0);
    engine.update_position("d1", target, true, Some(42.0), t0).unwrap();

    let Some(Controller::Vehicle(vehicle)) = engine.object("d1") else {
        panic!("d1 should be a vehicle");
    };
    let samples: Vec<_> = vehicle.live_path().samples().collect();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].scalar, Some(42.0));
    // single-value range maps to the midpoint of the ramp
    let ramp = EngineConfig::default().live_path.ramp;
    let hue = samples[0].color.hue().unwrap();
    assert!((hue - ramp.hue_at(0.5)).abs() < 0.01);

    let range = vehicle.live_path().range();
    assert_eq!((range.min, range.max), (42.0, 42.0));

    // the animation lands on the target
    engine.tick(t0 + Duration::from_secs(1));
    let position = engine.object("d1").unwrap().position();
    assert!(position.distance_to(&target.to_world()) < 1e-6);

    let mut saw_legend = false;
    let mut saw_distance = false;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::Legend { object_id, range } => {
                assert_eq!(object_id, "d1");
                assert_eq!(range.min, 42.0);
                saw_legend = true;
            }
            EngineEvent::Distance { reading, .. } => {
                assert!(reading.label.ends_with(" m"));
                saw_distance = true;
            }
            _ => {}
        }
    }
    assert!(saw_legend && saw_distance);
}

#[tokio::test]
async fn live_path_grows_and_resets() {
    let mut engine = engine_with_flat_ground(0.0);
    engine
        .add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 10.0))
        .unwrap();
    let t0 = Instant::now();

    for i in 0..5 {
        let point = GeoPoint::new(10.0 + i as f64 * 0.0001, 55.0, 10.0);
        let now = t0 + Duration::from_millis(200 * i);
        engine.update_position("d1", point, true, Some(i as f64 * 100.0), now).unwrap();
        engine.tick(now);
    }

    let path = engine.renderer().snapshot().into_iter().find_map(|(_, r)| match r {
        Renderable::Polyline { positions, colors: PolylineColors::PerVertex(colors), .. } => {
            Some((positions.len(), colors.len()))
        }
        _ => None,
    });
    assert_eq!(path, Some((5, 5)));

    // no flight path: position moves, path does not grow
    engine
        .update_position("d1", GeoPoint::new(10.01, 55.0, 10.0), false, Some(1.0), t0)
        .unwrap();
    let Some(Controller::Vehicle(vehicle)) = engine.object("d1") else {
        panic!("d1 should be a vehicle");
    };
    assert_eq!(vehicle.live_path().len(), 5);

    engine.remove_live_path("d1").unwrap();
    assert_eq!(engine.renderer().len(), 1);
    engine.reset_live_path("d1").unwrap();
    assert_eq!(engine.objects()[0].live_path_len, 0);
}

#[tokio::test]
async fn terrain_height_shifts_positions() {
    let mut engine = engine_with_flat_ground(30.0);
    let resolver = engine.resolver().clone();

    let relative = GeoPoint::new(10.0, 55.0, 100.0);
    let absolute = resolver
        .absolute(AltitudeMode::GroundReference, "d1", relative)
        .await;
    assert_eq!(absolute.alt, 130.0);

    engine.add_tracked_object("d1", TrackedKind::Vehicle, absolute).unwrap();
    engine
        .set_determined_route("d1", &[10.0], &[55.0], &[100.0])
        .unwrap();

    let Some(Controller::Vehicle(vehicle)) = engine.object("d1") else {
        panic!("d1 should be a vehicle");
    };
    assert!(vehicle.route().waypoints()[0].distance_to(&absolute.to_world()) < 1e-6);

    engine.remove_tracked_object("d1").unwrap();
    assert_eq!(resolver.ground_ref("d1"), None);
    assert!(engine.renderer().is_empty());
}

#[test]
fn mixed_fleet_listing_and_clear() {
    let mut engine = engine_with_flat_ground(0.0);
    engine
        .add_tracked_object("gs", TrackedKind::Station, GeoPoint::new(10.0, 55.0, 0.0))
        .unwrap();
    engine
        .add_tracked_object("d2", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 5.0))
        .unwrap();
    engine
        .add_tracked_object("d1", TrackedKind::Vehicle, GeoPoint::new(10.0, 55.0, 5.0))
        .unwrap();

    assert_eq!(engine.snapshot_ids(), vec!["gs", "d2", "d1"]);
    let kinds: Vec<_> = engine.objects().into_iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![TrackedKind::Station, TrackedKind::Vehicle, TrackedKind::Vehicle]
    );

    engine.clear();
    assert!(engine.is_empty());
    assert!(engine.renderer().is_empty());
}
