//! Engine actor.
//!
//! Owns the [`TelemetryEngine`] and is the only task that touches it.
//! Commands are prepared concurrently (terrain lookups) but applied strictly
//! in arrival order, while the frame ticker keeps animations running.

use futures::stream::{FuturesOrdered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval, Instant, MissedTickBehavior};

use geotrace_core::{
    AltitudeMode, EngineError, EngineEvent, GeoPoint, Orientation, RenderHandle, Renderable,
    TelemetryEngine, TerrainHeightResolver, TrackedKind, TrackedObjectInfo,
};

use crate::scene::StreamingScene;
use crate::stream::{StreamEvent, StreamHub};

type Reply<T> = oneshot::Sender<T>;

/// Live renderables together with the stream sequence number they include.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub seq: u64,
    pub items: Vec<(RenderHandle, Renderable)>,
}

/// Inbound operations. Points carry altitudes relative to the ground; the
/// actor turns them into absolute ones before applying.
#[derive(Debug)]
pub enum EngineCommand {
    Add {
        id: String,
        kind: TrackedKind,
        point: GeoPoint,
        reply: Reply<Result<(), EngineError>>,
    },
    UpdatePosition {
        id: String,
        point: GeoPoint,
        flight_path_enabled: bool,
        scalar: Option<f64>,
        reply: Reply<Result<(), EngineError>>,
    },
    SetRoute {
        id: String,
        lons: Vec<f64>,
        lats: Vec<f64>,
        alts: Vec<f64>,
        reply: Reply<Result<usize, EngineError>>,
    },
    RemoveLivePath {
        id: String,
        reply: Reply<Result<(), EngineError>>,
    },
    ResetLivePath {
        id: String,
        reply: Reply<Result<(), EngineError>>,
    },
    RemoveRoute {
        id: String,
        reply: Reply<Result<(), EngineError>>,
    },
    Remove {
        id: String,
        reply: Reply<Result<(), EngineError>>,
    },
    Follow {
        id: Option<String>,
        reply: Reply<Result<(), EngineError>>,
    },
    SetOrientation {
        id: String,
        orientation: Orientation,
        reply: Reply<Result<(), EngineError>>,
    },
    RotatePayload {
        id: String,
        yaw: f64,
        pitch: f64,
        roll: f64,
        reply: Reply<Result<Orientation, EngineError>>,
    },
    PointPayload {
        id: String,
        target: Option<String>,
        reply: Reply<Result<(), EngineError>>,
    },
    ListObjects {
        reply: Reply<Vec<TrackedObjectInfo>>,
    },
    Snapshot {
        reply: Reply<SceneSnapshot>,
    },
}

/// Correct altitudes. Runs concurrently with other preparations.
async fn prepare(
    resolver: Arc<TerrainHeightResolver>,
    mode: AltitudeMode,
    mut command: EngineCommand,
) -> EngineCommand {
    match &mut command {
        EngineCommand::Add { id, point, .. } => {
            // Routes are always relative to the ground reference
            if mode != AltitudeMode::Absolute {
                resolver.set_ground_ref(id, point.lon, point.lat).await;
            }
            *point = resolver.absolute(mode, id, *point).await;
        }
        EngineCommand::UpdatePosition { id, point, .. } => {
            *point = resolver.absolute(mode, id, *point).await;
        }
        _ => {}
    }
    command
}

fn apply(engine: &mut TelemetryEngine<StreamingScene>, command: EngineCommand) {
    // A dropped reply only means the caller went away
    match command {
        EngineCommand::Add { id, kind, point, reply } => {
            let _ = reply.send(engine.add_tracked_object(&id, kind, point));
        }
        EngineCommand::UpdatePosition {
            id,
            point,
            flight_path_enabled,
            scalar,
            reply,
        } => {
            let result = engine.update_position(&id, point, flight_path_enabled, scalar, Instant::now());
            let _ = reply.send(result);
        }
        EngineCommand::SetRoute {
            id,
            lons,
            lats,
            alts,
            reply,
        } => {
            let _ = reply.send(engine.set_determined_route(&id, &lons, &lats, &alts));
        }
        EngineCommand::RemoveLivePath { id, reply } => {
            let _ = reply.send(engine.remove_live_path(&id));
        }
        EngineCommand::ResetLivePath { id, reply } => {
            let _ = reply.send(engine.reset_live_path(&id));
        }
        EngineCommand::RemoveRoute { id, reply } => {
            let _ = reply.send(engine.remove_determined_route(&id));
        }
        EngineCommand::Remove { id, reply } => {
            let _ = reply.send(engine.remove_tracked_object(&id));
        }
        EngineCommand::Follow { id, reply } => {
            let _ = reply.send(engine.follow(id.as_deref()));
        }
        EngineCommand::SetOrientation { id, orientation, reply } => {
            let _ = reply.send(engine.set_orientation(&id, orientation));
        }
        EngineCommand::RotatePayload {
            id,
            yaw,
            pitch,
            roll,
            reply,
        } => {
            let _ = reply.send(engine.rotate_payload(&id, yaw, pitch, roll));
        }
        EngineCommand::PointPayload { id, target, reply } => {
            let _ = reply.send(engine.point_payload_at(&id, target.as_deref()));
        }
        EngineCommand::ListObjects { reply } => {
            let _ = reply.send(engine.objects());
        }
        EngineCommand::Snapshot { reply } => {
            // Engine events are forwarded after every command, so every
            // scene change up to `seq` is already in the items
            let scene = engine.renderer();
            let _ = reply.send(SceneSnapshot {
                seq: scene.last_seq(),
                items: scene.scene().snapshot(),
            });
        }
    }
}

fn forward_events(events: &mut broadcast::Receiver<EngineEvent>, hub: &StreamHub) {
    loop {
        match events.try_recv() {
            Ok(event) => hub.publish(StreamEvent::Engine(event)),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "engine events dropped before streaming");
            }
            Err(_) => break,
        }
    }
}

/// Run until every command sender is dropped and queued work is applied.
pub async fn run_engine_loop(
    mut engine: TelemetryEngine<StreamingScene>,
    mut commands: mpsc::Receiver<EngineCommand>,
    hub: StreamHub,
    frame_interval: Duration,
) {
    let resolver = engine.resolver().clone();
    let mode = engine.config().altitude_mode;
    let mut events = engine.subscribe();
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pending = FuturesOrdered::new();
    let mut accepting = true;

    tracing::info!(?mode, frame_ms = frame_interval.as_millis() as u64, "engine loop started");

    loop {
        tokio::select! {
            command = commands.recv(), if accepting => match command {
                Some(command) => pending.push_back(prepare(resolver.clone(), mode, command)),
                None => accepting = false,
            },
            Some(prepared) = pending.next(), if !pending.is_empty() => {
                apply(&mut engine, prepared);
            }
            _ = ticker.tick() => {
                engine.tick(Instant::now());
            }
        }

        forward_events(&mut events, &hub);

        if !accepting && pending.is_empty() {
            break;
        }
    }

    tracing::info!(objects = engine.len(), "engine loop stopped");
}
