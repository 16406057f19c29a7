//! Renderer that keeps the scene in memory and streams every change.

use geotrace_core::{MemoryScene, Orientation, RenderHandle, Renderable, Renderer, WorldPosition};

use crate::stream::{SceneEvent, StreamEvent, StreamHub};

pub struct StreamingScene {
    scene: MemoryScene,
    hub: StreamHub,
}

impl StreamingScene {
    pub fn new(hub: StreamHub) -> Self {
        Self {
            scene: MemoryScene::new(),
            hub,
        }
    }

    pub fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    /// Sequence number of the latest published event, 0 before any.
    pub fn last_seq(&self) -> u64 {
        self.hub.last_seq()
    }

    fn publish(&self, event: SceneEvent) {
        self.hub.publish(StreamEvent::Scene(event));
    }
}

impl Renderer for StreamingScene {
    fn create(&mut self, renderable: Renderable) -> RenderHandle {
        let handle = self.scene.create(renderable.clone());
        self.publish(SceneEvent::Created { handle, renderable });
        handle
    }

    fn update_position(&mut self, handle: RenderHandle, position: WorldPosition) {
        if !self.scene.contains(handle) {
            return;
        }
        self.scene.update_position(handle, position);
        self.publish(SceneEvent::Moved { handle, position });
    }

    fn update_orientation(&mut self, handle: RenderHandle, orientation: Orientation) {
        if !matches!(self.scene.get(handle), Some(Renderable::Model { .. })) {
            return;
        }
        self.scene.update_orientation(handle, orientation);
        self.publish(SceneEvent::Oriented { handle, orientation });
    }

    fn update_payload(&mut self, handle: RenderHandle, orientation: Orientation) {
        if !matches!(self.scene.get(handle), Some(Renderable::Model { payload: Some(_), .. })) {
            return;
        }
        self.scene.update_payload(handle, orientation);
        self.publish(SceneEvent::PayloadOriented { handle, orientation });
    }

    fn update_label(&mut self, handle: RenderHandle, position: WorldPosition, text: &str) {
        if !self.scene.contains(handle) {
            return;
        }
        self.scene.update_label(handle, position, text);
        self.publish(SceneEvent::LabelChanged {
            handle,
            position,
            text: text.to_string(),
        });
    }

    fn destroy(&mut self, handle: RenderHandle) {
        if !self.scene.contains(handle) {
            return;
        }
        self.scene.destroy(handle);
        self.publish(SceneEvent::Destroyed { handle });
    }

    fn follow(&mut self, handle: Option<RenderHandle>) {
        self.scene.follow(handle);
        self.publish(SceneEvent::Follow { handle });
    }
}
