//! Connector tests against a local websocket server

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::SinkExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use rvoip_ari_core::connector::HandlerError;
use rvoip_ari_core::prelude::*;
use rvoip_ari_core::{AriConnector, ConnectionState, ConnectorConfig, FrameOutcome};

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<Event>>,
    fail: bool,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle_event(&self, event: Event) -> Result<(), HandlerError> {
        self.events.lock().await.push(event);
        if self.fail {
            return Err("handler refused".into());
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    frames: Mutex<Vec<(String, Bytes)>>,
    fail: bool,
}

#[async_trait]
impl RawEventPublisher for RecordingPublisher {
    async fn publish_raw_event(&self, asterisk_id: &str, data: Bytes) -> rvoip_ari_core::Result<()> {
        self.frames.lock().await.push((asterisk_id.to_string(), data));
        if self.fail {
            return Err(AriError::publish("bus down"));
        }
        Ok(())
    }
}

fn bridge_frame(event_type: &str, bridge_id: &str) -> String {
    format!(
        r#"{{"type":"{}","application":"voipbin","asterisk_id":"ast-1","timestamp":"2020-04-19T14:38:00.363+0000","bridge":{{"id":"{}","name":"join=true"}}}}"#,
        event_type, bridge_id
    )
}

async fn wait_for_events(handler: &RecordingHandler, count: usize) -> Vec<Event> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let events = handler.events.lock().await;
                if events.len() >= count {
                    return events.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("events were not delivered in time")
}

#[tokio::test]
async fn test_frames_are_published_and_dispatched_in_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(bridge_frame("BridgeCreated", "b1"))).await.unwrap();
        ws.send(Message::Text("{\"type\":\"Dial\"}".to_string())).await.unwrap();
        ws.send(Message::Text("garbage".to_string())).await.unwrap();
        ws.send(Message::Text(bridge_frame("BridgeDestroyed", "b1"))).await.unwrap();
        // keep the session open until the client has read everything
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = ws.close(None).await;
    });

    let handler = Arc::new(RecordingHandler::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let connector = Arc::new(AriConnector::new(
        ConnectorConfig::new("ast-1", format!("ws://{}/ari/events?app=voipbin", addr)),
        handler.clone(),
        publisher.clone(),
    ));

    let runner = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run().await })
    };

    let events = wait_for_events(&handler, 2).await;
    assert_eq!(events[0].event_type(), EventType::BridgeCreated);
    assert_eq!(events[1].event_type(), EventType::BridgeDestroyed);
    assert_eq!(events[1].timestamp(), "2020-04-19 14:38:00.363000");

    // every frame reaches the bus, decodable or not
    let frames = publisher.frames.lock().await.clone();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|(id, _)| id == "ast-1"));
    assert_eq!(frames[2].1, Bytes::from_static(b"garbage"));

    runner.abort();
    let _ = server.await;
}

#[tokio::test]
async fn test_publish_failure_does_not_block_dispatch() {
    let handler = Arc::new(RecordingHandler::default());
    let publisher = Arc::new(RecordingPublisher {
        fail: true,
        ..Default::default()
    });
    let connector = AriConnector::new(
        ConnectorConfig::new("ast-1", "ws://127.0.0.1:1"),
        handler.clone(),
        publisher.clone(),
    );

    let outcome = connector
        .process_frame(Bytes::from(bridge_frame("BridgeCreated", "b2")))
        .await;
    assert_eq!(outcome, FrameOutcome::Dispatched);
    assert_eq!(handler.events.lock().await.len(), 1);
    assert_eq!(publisher.frames.lock().await.len(), 1);
}

#[tokio::test]
async fn test_frame_outcomes() {
    let handler = Arc::new(RecordingHandler {
        fail: true,
        ..Default::default()
    });
    let connector = AriConnector::new(
        ConnectorConfig::new("ast-1", "ws://127.0.0.1:1"),
        handler.clone(),
        Arc::new(RecordingPublisher::default()),
    );

    assert_eq!(
        connector.process_frame(Bytes::from_static(b"{\"type\":\"ChannelHold\"}")).await,
        FrameOutcome::Dropped
    );
    assert_eq!(
        connector.process_frame(Bytes::from_static(b"[1,2,3]")).await,
        FrameOutcome::Dropped
    );
    assert_eq!(
        connector
            .process_frame(Bytes::from(bridge_frame("BridgeCreated", "b3")))
            .await,
        FrameOutcome::HandlerFailed
    );
}

#[tokio::test]
async fn test_reconnects_after_session_ends() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        for bridge_id in ["first", "second"] {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(bridge_frame("BridgeCreated", bridge_id)))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = ws.close(None).await;
        }
    });

    let handler = Arc::new(RecordingHandler::default());
    let mut config = ConnectorConfig::new("ast-1", format!("ws://{}", addr));
    config.reconnect_delay = Duration::from_millis(50);
    let connector = Arc::new(AriConnector::new(
        config,
        handler.clone(),
        Arc::new(RecordingPublisher::default()),
    ));
    let runner = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run().await })
    };

    let events = wait_for_events(&handler, 2).await;
    let ids: Vec<String> = events
        .iter()
        .map(|e| match e {
            Event::BridgeCreated(e) => e.bridge.id.clone(),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(ids, vec!["first".to_string(), "second".to_string()]);

    runner.abort();
    let _ = server.await;
}

#[tokio::test]
async fn test_connect_failure_keeps_retrying() {
    // grab a free port and release it so nothing is listening there
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let mut config = ConnectorConfig::new("ast-1", format!("ws://{}", addr));
    config.reconnect_delay = Duration::from_millis(20);
    let connector = Arc::new(AriConnector::new(
        config,
        Arc::new(RecordingHandler::default()),
        Arc::new(RecordingPublisher::default()),
    ));
    let mut states = connector.subscribe_state();
    assert_eq!(connector.state(), ConnectionState::Disconnected);

    let runner = {
        let connector = connector.clone();
        tokio::spawn(async move { connector.run().await })
    };

    // each failed attempt flips the state at least once
    let mut transitions = 0;
    tokio::time::timeout(Duration::from_secs(5), async {
        while transitions < 3 {
            states.changed().await.unwrap();
            let state = *states.borrow_and_update();
            assert_ne!(state, ConnectionState::Connected);
            transitions += 1;
        }
    })
    .await
    .expect("connector did not retry");

    runner.abort();
}
