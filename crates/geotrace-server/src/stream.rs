//! Fan-out of scene changes and engine events to WebSocket clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use geotrace_core::{EngineEvent, Orientation, RenderHandle, Renderable, WorldPosition};

/// One change on the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneEvent {
    Created { handle: RenderHandle, renderable: Renderable },
    Moved { handle: RenderHandle, position: WorldPosition },
    Oriented { handle: RenderHandle, orientation: Orientation },
    PayloadOriented { handle: RenderHandle, orientation: Orientation },
    LabelChanged { handle: RenderHandle, position: WorldPosition, text: String },
    Destroyed { handle: RenderHandle },
    Follow { handle: Option<RenderHandle> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    Scene(SceneEvent),
    Engine(EngineEvent),
}

impl StreamEvent {
    pub fn is_scene(&self) -> bool {
        matches!(self, StreamEvent::Scene(_))
    }
}

/// Wire envelope sent to stream clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMessage {
    pub seq: u64,
    pub emitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: StreamEvent,
}

/// Serialized message ready for the socket.
#[derive(Debug, Clone)]
pub struct StreamPayload {
    pub seq: u64,
    pub is_scene: bool,
    pub json: Arc<str>,
}

#[derive(Clone)]
pub struct StreamHub {
    tx: broadcast::Sender<StreamPayload>,
    seq: Arc<AtomicU64>,
}

impl StreamHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamPayload> {
        self.tx.subscribe()
    }

    /// Number the event and hand it to every subscriber. Sequence numbers
    /// advance even when nobody is listening.
    pub fn publish(&self, event: StreamEvent) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        if self.tx.receiver_count() == 0 {
            return;
        }
        let is_scene = event.is_scene();
        let message = StreamMessage {
            seq,
            emitted_at: Utc::now(),
            event,
        };
        match serde_json::to_string(&message) {
            Ok(json) => {
                let _ = self.tx.send(StreamPayload {
                    seq,
                    is_scene,
                    json: Arc::from(json),
                });
            }
            Err(err) => tracing::error!(seq, "failed to encode stream message: {}", err),
        }
    }

    pub fn last_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_numbered_and_tagged() {
        let hub = StreamHub::new(16);
        let mut rx = hub.subscribe();

        hub.publish(StreamEvent::Scene(SceneEvent::Destroyed { handle: RenderHandle(7) }));
        hub.publish(StreamEvent::Engine(EngineEvent::ObjectRemoved { id: "d1".into() }));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!((first.seq, second.seq), (1, 2));
        assert!(first.is_scene && !second.is_scene);

        let value: serde_json::Value = serde_json::from_str(&first.json).unwrap();
        assert_eq!(value["seq"], 1);
        assert_eq!(value["source"], "scene");
        assert_eq!(value["event"]["op"], "destroyed");
        assert_eq!(value["event"]["handle"], 7);

        let value: serde_json::Value = serde_json::from_str(&second.json).unwrap();
        assert_eq!(value["event"]["type"], "object_removed");
        assert_eq!(hub.last_seq(), 2);
    }

    #[test]
    fn publishing_without_subscribers_still_counts() {
        let hub = StreamHub::new(4);
        hub.publish(StreamEvent::Engine(EngineEvent::Follow { id: None }));
        let mut rx = hub.subscribe();
        hub.publish(StreamEvent::Engine(EngineEvent::Follow { id: None }));
        assert_eq!(rx.try_recv().unwrap().seq, 2);
    }
}
