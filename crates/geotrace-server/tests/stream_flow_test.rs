//! End-to-end flow over a real listener: REST commands in, stream messages out.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use geotrace_core::{EngineEvent, FlatElevation, TerrainHeightResolver, TrackedKind};
use geotrace_server::config::Config;
use geotrace_server::stream::{SceneEvent, StreamEvent, StreamMessage, StreamPayload};
use geotrace_server::{api, state};

async fn spawn_server() -> (String, state::Runtime) {
    let config = Config {
        animation_ms: 50,
        ..Config::default()
    };
    let resolver = TerrainHeightResolver::with_settings(FlatElevation(0.0), config.terrain_settings());
    let runtime = state::start(&config, resolver);
    let app = api::app(runtime.state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), runtime)
}

async fn next_message(rx: &mut broadcast::Receiver<StreamPayload>) -> StreamMessage {
    let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("stream message in time")
        .expect("stream open");
    let message: StreamMessage = serde_json::from_str(&payload.json).unwrap();
    assert_eq!(message.seq, payload.seq);
    message
}

#[tokio::test]
async fn add_and_move_reach_the_stream() {
    let (base, runtime) = spawn_server().await;
    let mut rx = runtime.state.hub().subscribe();
    let client = Client::new();

    let resp = client
        .post(format!("{}/v1/objects", base))
        .json(&json!({"id": "drone-1", "lon": 10.0, "lat": 55.0, "alt": 80.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let created = next_message(&mut rx).await;
    let model_handle = match created.event {
        StreamEvent::Scene(SceneEvent::Created { handle, .. }) => handle,
        other => panic!("expected model creation, got {:?}", other),
    };
    let added = next_message(&mut rx).await;
    assert!(added.seq > created.seq);
    assert_eq!(
        added.event,
        StreamEvent::Engine(EngineEvent::ObjectAdded {
            id: "drone-1".to_string(),
            kind: TrackedKind::Vehicle,
        })
    );

    let resp = client
        .post(format!("{}/v1/objects/drone-1/position", base))
        .json(&json!({"lon": 10.001, "lat": 55.0, "alt": 80.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);

    // The animation settles within a few frames; the last move lands on the target.
    let mut moves = 0;
    loop {
        let message = next_message(&mut rx).await;
        if let StreamEvent::Scene(SceneEvent::Moved { handle, .. }) = message.event {
            assert_eq!(handle, model_handle);
            moves += 1;
            let objects: serde_json::Value = client
                .get(format!("{}/v1/objects", base))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            let target = geotrace_core::GeoPoint::new(10.001, 55.0, 80.0).to_world();
            let x = objects[0]["position"]["x"].as_f64().unwrap();
            if (x - target.x).abs() < 1e-6 {
                break;
            }
        }
    }
    assert!(moves >= 1);
}

#[tokio::test]
async fn removal_is_streamed_and_listed() {
    let (base, runtime) = spawn_server().await;
    let client = Client::new();

    for id in ["a", "b"] {
        let resp = client
            .post(format!("{}/v1/objects", base))
            .json(&json!({"id": id, "kind": "station", "lon": 10.0, "lat": 55.0, "alt": 0.0}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let mut rx = runtime.state.hub().subscribe();
    let resp = client.delete(format!("{}/v1/objects/a", base)).send().await.unwrap();
    assert_eq!(resp.status(), 204);

    let destroyed = next_message(&mut rx).await;
    assert!(matches!(destroyed.event, StreamEvent::Scene(SceneEvent::Destroyed { .. })));
    let removed = next_message(&mut rx).await;
    assert_eq!(
        removed.event,
        StreamEvent::Engine(EngineEvent::ObjectRemoved { id: "a".to_string() })
    );

    let objects: serde_json::Value = client
        .get(format!("{}/v1/objects", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(objects.as_array().unwrap().len(), 1);
    assert_eq!(objects[0]["id"], "b");
    assert_eq!(objects[0]["kind"], "station");
}
