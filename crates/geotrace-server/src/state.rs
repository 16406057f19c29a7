//! Shared application state handed to every handler.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use geotrace_core::{
    EngineError, GeoPoint, Orientation, TelemetryEngine, TerrainHeightResolver, TrackedKind,
    TrackedObjectInfo,
};

use crate::config::Config;
use crate::loops::engine_loop::{run_engine_loop, EngineCommand, SceneSnapshot};
use crate::loops::terrain_prune_loop::run_terrain_prune_loop;
use crate::scene::StreamingScene;
use crate::stream::StreamHub;

/// Why a request could not be served by the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineRequestError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("engine task is not running")]
    Unavailable,
}

/// Cloneable front door to the engine actor.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(tx: mpsc::Sender<EngineCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T, EngineRequestError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| EngineRequestError::Unavailable)?;
        rx.await.map_err(|_| EngineRequestError::Unavailable)
    }

    pub async fn add_object(&self, id: String, kind: TrackedKind, point: GeoPoint) -> Result<(), EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::Add { id, kind, point, reply })
            .await??)
    }

    pub async fn update_position(
        &self,
        id: String,
        point: GeoPoint,
        flight_path_enabled: bool,
        scalar: Option<f64>,
    ) -> Result<(), EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::UpdatePosition {
                id,
                point,
                flight_path_enabled,
                scalar,
                reply,
            })
            .await??)
    }

    pub async fn set_route(
        &self,
        id: String,
        lons: Vec<f64>,
        lats: Vec<f64>,
        alts: Vec<f64>,
    ) -> Result<usize, EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::SetRoute {
                id,
                lons,
                lats,
                alts,
                reply,
            })
            .await??)
    }

    pub async fn remove_live_path(&self, id: String) -> Result<(), EngineRequestError> {
        Ok(self.request(|reply| EngineCommand::RemoveLivePath { id, reply }).await??)
    }

    pub async fn reset_live_path(&self, id: String) -> Result<(), EngineRequestError> {
        Ok(self.request(|reply| EngineCommand::ResetLivePath { id, reply }).await??)
    }

    pub async fn remove_route(&self, id: String) -> Result<(), EngineRequestError> {
        Ok(self.request(|reply| EngineCommand::RemoveRoute { id, reply }).await??)
    }

    pub async fn remove_object(&self, id: String) -> Result<(), EngineRequestError> {
        Ok(self.request(|reply| EngineCommand::Remove { id, reply }).await??)
    }

    pub async fn follow(&self, id: Option<String>) -> Result<(), EngineRequestError> {
        Ok(self.request(|reply| EngineCommand::Follow { id, reply }).await??)
    }

    pub async fn set_orientation(&self, id: String, orientation: Orientation) -> Result<(), EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::SetOrientation { id, orientation, reply })
            .await??)
    }

    pub async fn rotate_payload(
        &self,
        id: String,
        yaw: f64,
        pitch: f64,
        roll: f64,
    ) -> Result<Orientation, EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::RotatePayload {
                id,
                yaw,
                pitch,
                roll,
                reply,
            })
            .await??)
    }

    pub async fn point_payload(&self, id: String, target: Option<String>) -> Result<(), EngineRequestError> {
        Ok(self
            .request(|reply| EngineCommand::PointPayload { id, target, reply })
            .await??)
    }

    pub async fn list_objects(&self) -> Result<Vec<TrackedObjectInfo>, EngineRequestError> {
        self.request(|reply| EngineCommand::ListObjects { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SceneSnapshot, EngineRequestError> {
        self.request(|reply| EngineCommand::Snapshot { reply }).await
    }
}

pub struct AppState {
    engine: EngineHandle,
    resolver: Arc<TerrainHeightResolver>,
    hub: StreamHub,
}

impl AppState {
    pub fn new(engine: EngineHandle, resolver: Arc<TerrainHeightResolver>, hub: StreamHub) -> Self {
        Self { engine, resolver, hub }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn resolver(&self) -> &Arc<TerrainHeightResolver> {
        &self.resolver
    }

    pub fn hub(&self) -> &StreamHub {
        &self.hub
    }
}

/// Background tasks owned by a running server.
pub struct Runtime {
    pub state: Arc<AppState>,
    pub engine_task: JoinHandle<()>,
    pub prune_task: JoinHandle<()>,
}

/// Build the engine around `resolver` and spawn its loops.
pub fn start(config: &Config, resolver: TerrainHeightResolver) -> Runtime {
    let resolver = Arc::new(resolver);
    let hub = StreamHub::new(config.stream_buffer);
    let engine = TelemetryEngine::new(
        StreamingScene::new(hub.clone()),
        resolver.clone(),
        config.engine_config(),
    );
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));

    let engine_task = tokio::spawn(run_engine_loop(engine, rx, hub.clone(), config.frame_interval()));
    let prune_task = tokio::spawn(run_terrain_prune_loop(
        resolver.clone(),
        std::time::Duration::from_secs(config.terrain_prune_interval_s),
    ));

    let state = Arc::new(AppState::new(EngineHandle::new(tx), resolver, hub));
    Runtime {
        state,
        engine_task,
        prune_task,
    }
}
