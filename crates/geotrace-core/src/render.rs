//! Boundary to the rendering surface (the Scene).
//!
//! The engine only ever describes what should exist; a [`Renderer`] decides
//! how. The contract is create/destroy plus in-place updates of model pose
//! (position, orientation, payload orientation) and label text. Geometry is
//! never patched, so callers rebuild polylines by destroying and creating.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Color, Orientation, TrackedKind};
use crate::spatial::WorldPosition;

/// Opaque id of something the Scene created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderHandle(pub u64);

/// Vertex coloring of a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "colors", rename_all = "snake_case")]
pub enum PolylineColors {
    Uniform(Color),
    PerVertex(Vec<Color>),
}

/// Description of a renderable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Renderable {
    /// Vehicle or station model
    Model {
        object_id: String,
        kind: TrackedKind,
        position: WorldPosition,
        #[serde(default)]
        orientation: Orientation,
        /// Gimbal orientation of the carried payload, vehicles only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Orientation>,
    },
    /// Screen-sized point marker
    Point {
        position: WorldPosition,
        color: Color,
        pixel_size: f32,
    },
    Polyline {
        positions: Vec<WorldPosition>,
        colors: PolylineColors,
        width: f32,
        translucent: bool,
    },
    Label {
        position: WorldPosition,
        text: String,
    },
}

/// The rendering surface as seen by the engine.
pub trait Renderer {
    fn create(&mut self, renderable: Renderable) -> RenderHandle;

    /// Move a model or point. Unknown handles are ignored.
    fn update_position(&mut self, handle: RenderHandle, position: WorldPosition);

    /// Turn a model. Unknown handles are ignored.
    fn update_orientation(&mut self, handle: RenderHandle, orientation: Orientation);

    /// Turn the payload of a model that carries one. Unknown handles and
    /// models without a payload are ignored.
    fn update_payload(&mut self, handle: RenderHandle, orientation: Orientation);

    /// Change a label in place. Unknown handles are ignored.
    fn update_label(&mut self, handle: RenderHandle, position: WorldPosition, text: &str);

    /// Remove from the Scene. Unknown handles are ignored.
    fn destroy(&mut self, handle: RenderHandle);

    /// Attach (Some) or detach (None) the camera follow.
    fn follow(&mut self, handle: Option<RenderHandle>);
}

/// Headless Scene that keeps every live renderable in memory.
///
/// Used by tests and as the bookkeeping half of streaming renderers.
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_handle: u64,
    live: HashMap<RenderHandle, Renderable>,
    followed: Option<RenderHandle>,
    created: usize,
    destroyed: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&Renderable> {
        self.live.get(&handle)
    }

    pub fn contains(&self, handle: RenderHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live renderables ordered by handle (creation order).
    pub fn snapshot(&self) -> Vec<(RenderHandle, Renderable)> {
        let mut items: Vec<_> = self
            .live
            .iter()
            .map(|(handle, renderable)| (*handle, renderable.clone()))
            .collect();
        items.sort_by_key(|(handle, _)| *handle);
        items
    }

    pub fn followed(&self) -> Option<RenderHandle> {
        self.followed
    }

    /// Total number of `create` calls so far.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total number of effective `destroy` calls so far.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    pub fn count_where(&self, predicate: impl Fn(&Renderable) -> bool) -> usize {
        self.live.values().filter(|renderable| predicate(renderable)).count()
    }
}

impl Renderer for MemoryScene {
    fn create(&mut self, renderable: Renderable) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle(self.next_handle);
        self.live.insert(handle, renderable);
        self.created += 1;
        handle
    }

    fn update_position(&mut self, handle: RenderHandle, new_position: WorldPosition) {
        match self.live.get_mut(&handle) {
            Some(Renderable::Model { position, .. }) | Some(Renderable::Point { position, .. }) => {
                *position = new_position;
            }
            Some(_) => tracing::debug!(?handle, "position update on non-movable renderable"),
            None => {}
        }
    }

    fn update_orientation(&mut self, handle: RenderHandle, new_orientation: Orientation) {
        if let Some(Renderable::Model { orientation, .. }) = self.live.get_mut(&handle) {
            *orientation = new_orientation;
        }
    }

    fn update_payload(&mut self, handle: RenderHandle, new_orientation: Orientation) {
        if let Some(Renderable::Model {
            payload: Some(payload),
            ..
        }) = self.live.get_mut(&handle)
        {
            *payload = new_orientation;
        }
    }

    fn update_label(&mut self, handle: RenderHandle, new_position: WorldPosition, new_text: &str) {
        if let Some(Renderable::Label { position, text }) = self.live.get_mut(&handle) {
            *position = new_position;
            new_text.clone_into(text);
        }
    }

    fn destroy(&mut self, handle: RenderHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        }
        if self.followed == Some(handle) {
            self.followed = None;
        }
    }

    fn follow(&mut self, handle: Option<RenderHandle>) {
        self.followed = handle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> Renderable {
        Renderable::Label {
            position: WorldPosition::new(0.0, 0.0, 0.0),
            text: text.to_string(),
        }
    }

    #[test]
    fn create_update_destroy() {
        let mut scene = MemoryScene::new();
        let handle = scene.create(label("a"));
        assert!(scene.contains(handle));

        scene.update_label(handle, WorldPosition::new(1.0, 2.0, 3.0), "b");
        assert_eq!(
            scene.get(handle),
            Some(&Renderable::Label {
                position: WorldPosition::new(1.0, 2.0, 3.0),
                text: "b".to_string(),
            })
        );

        scene.destroy(handle);
        scene.destroy(handle);
        assert!(scene.is_empty());
        assert_eq!(scene.created_count(), 1);
        assert_eq!(scene.destroyed_count(), 1);
    }

    #[test]
    fn destroying_followed_handle_detaches_camera() {
        let mut scene = MemoryScene::new();
        let handle = scene.create(Renderable::Model {
            object_id: "d1".into(),
            kind: TrackedKind::Vehicle,
            position: WorldPosition::new(0.0, 0.0, 0.0),
            orientation: Orientation::default(),
            payload: Some(Orientation::default()),
        });
        scene.follow(Some(handle));
        assert_eq!(scene.followed(), Some(handle));
        scene.destroy(handle);
        assert_eq!(scene.followed(), None);
    }

    #[test]
    fn payload_updates_only_touch_models_with_payload() {
        let mut scene = MemoryScene::new();
        let station = scene.create(Renderable::Model {
            object_id: "gs".into(),
            kind: TrackedKind::Station,
            position: WorldPosition::new(0.0, 0.0, 0.0),
            orientation: Orientation::default(),
            payload: None,
        });
        let turned = Orientation::new(90.0, 10.0, 0.0);

        scene.update_payload(station, turned);
        scene.update_orientation(station, turned);
        match scene.get(station) {
            Some(Renderable::Model { orientation, payload, .. }) => {
                assert_eq!(*orientation, turned);
                assert_eq!(*payload, None);
            }
            other => panic!("unexpected renderable {:?}", other),
        }

        let json = serde_json::to_value(scene.get(station).unwrap()).unwrap();
        assert!(json.get("payload").is_none());
        assert_eq!(json["orientation"]["heading"], 90.0);
    }

    #[test]
    fn renderable_json_is_tagged() {
        let value = serde_json::to_value(label("12.00 m")).unwrap();
        assert_eq!(value["type"], "label");
        assert_eq!(value["text"], "12.00 m");
    }
}
