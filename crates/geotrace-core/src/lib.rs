pub mod animator;
pub mod cache;
pub mod controller;
pub mod determined_route;
pub mod distance;
pub mod engine;
pub mod error;
pub mod live_path;
pub mod models;
pub mod pointing;
pub mod registry;
pub mod render;
pub mod spatial;
pub mod terrain;

pub use animator::PositionAnimator;
pub use controller::{Controller, StationController, VehicleController};
pub use determined_route::{DeterminedPathRenderer, RouteRejection, RouteStyle};
pub use distance::{nearest_waypoint, DistanceReading, DistanceTracker, NearestWaypoint};
pub use engine::{EngineConfig, EngineEvent, TelemetryEngine, TrackedObjectInfo};
pub use error::{ElevationError, EngineError};
pub use live_path::{ColorRamp, LivePathRenderer, LivePathStyle, SCALAR_SENTINEL};
pub use models::{Color, GeoPoint, Orientation, ScalarRange, TelemetrySample, TrackedKind};
pub use pointing::PointingLine;
pub use registry::{EntityRegistry, RegistryEntry};
pub use render::{MemoryScene, PolylineColors, RenderHandle, Renderable, Renderer};
pub use spatial::{heading_pitch, tolerance_degrees, WorldPosition};
pub use terrain::{
    AltitudeMode, ElevationProvider, FlatElevation, TerrainHeightResolver, TerrainSettings,
};
