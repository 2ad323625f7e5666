// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the WebSocket transport against a local server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use obegraensad_lib::protocol::{HttpClient, PushConnector, PushSession, WebSocketConnector};
use obegraensad_lib::types::RotateDirection;
use obegraensad_lib::{ConnectionStatus, Device, DeviceConfig, Error};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Accepts one WebSocket client, sends `greeting`, then forwards every
/// text frame it receives.
async fn spawn_server(greeting: Vec<&'static str>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        for frame in greeting {
            ws.send(Message::Text(frame.into())).await.unwrap();
        }

        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                let _ = tx.send(text.as_str().to_owned());
            }
        }
    });

    (url, rx)
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached");
}

mod session {
    use super::*;

    #[tokio::test]
    async fn receives_and_sends_text_frames() {
        let (url, mut server_rx) = spawn_server(vec![r#"{"brightness": 12}"#]).await;

        let connector = WebSocketConnector::new(url);
        let mut session = connector.connect().await.unwrap();

        let frame = session.recv().await.unwrap();
        assert_eq!(frame.as_deref(), Some(r#"{"brightness": 12}"#));

        session
            .send(r#"{"event":"rotate","direction":"right"}"#.to_string())
            .await
            .unwrap();
        let received = tokio::time::timeout(Duration::from_secs(5), server_rx.recv())
            .await
            .unwrap();
        assert_eq!(
            received.as_deref(),
            Some(r#"{"event":"rotate","direction":"right"}"#)
        );

        session.close().await;
    }

    #[tokio::test]
    async fn recv_returns_none_when_server_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let mut session = WebSocketConnector::new(url).connect().await.unwrap();
        let frame = tokio::time::timeout(Duration::from_secs(5), session.recv())
            .await
            .unwrap();

        assert!(matches!(frame, Ok(None)));
    }

    #[tokio::test]
    async fn connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connector = WebSocketConnector::new(format!("ws://{addr}/ws"));
        assert!(connector.connect().await.is_err());
    }
}

mod device {
    use super::*;

    async fn info_server(body: serde_json::Value) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn push_frames_update_state_and_commands_reach_device() {
        let (url, mut server_rx) = spawn_server(vec![r#"{"rotation": 2}"#]).await;
        let info = info_server(serde_json::json!({"brightness": 50})).await;

        let device = Device::with_transports(
            DeviceConfig::new("127.0.0.1").with_reconnect_delay(Duration::from_millis(100)),
            WebSocketConnector::new(url),
            HttpClient::new(info.uri()).unwrap(),
        );

        device.start().unwrap();
        wait_for(|| device.connection_status() == ConnectionStatus::Live).await;
        wait_for(|| device.state().brightness().value() == 50).await;
        wait_for(|| device.state().rotation().value() == 2).await;

        device.rotate(RotateDirection::Left).await.unwrap();
        let received = tokio::time::timeout(Duration::from_secs(5), server_rx.recv())
            .await
            .unwrap();
        assert_eq!(
            received.as_deref(),
            Some(r#"{"event":"rotate","direction":"left"}"#)
        );

        device.stop().await.unwrap();
        assert_eq!(device.connection_status(), ConnectionStatus::Disconnected);
        assert!(matches!(device.turn_on().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn unreachable_push_channel_still_polls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let info = info_server(serde_json::json!({"brightness": 64})).await;

        let device = Device::with_transports(
            DeviceConfig::new("127.0.0.1").with_reconnect_delay(Duration::from_millis(50)),
            WebSocketConnector::new(format!("ws://{addr}/ws")),
            HttpClient::new(info.uri()).unwrap(),
        );

        device.start().unwrap();
        wait_for(|| device.state().brightness().value() == 64).await;

        assert_ne!(device.connection_status(), ConnectionStatus::Live);
        device.stop().await.unwrap();
    }
}
