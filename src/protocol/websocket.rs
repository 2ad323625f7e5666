// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebSocket push transport.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ProtocolError;
use crate::protocol::{PushConnector, PushSession};

/// Connects to the device's `/ws` endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Creates a connector for the specified host.
    ///
    /// `host` may be a bare address (`192.168.5.60`, `matrix.local:8080`)
    /// or a full `ws://` URL, which is used as is.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        let url = if host.starts_with("ws://") || host.starts_with("wss://") {
            host
        } else {
            format!("ws://{host}/ws")
        };
        Self { url }
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PushConnector for WebSocketConnector {
    type Session = WebSocketSession;

    async fn connect(&self) -> Result<WebSocketSession, ProtocolError> {
        tracing::debug!(url = %self.url, "Opening WebSocket");

        let (stream, response) = connect_async(self.url.as_str()).await?;

        tracing::debug!(status = %response.status(), "WebSocket handshake complete");

        Ok(WebSocketSession { stream })
    }
}

/// An open WebSocket connection to the device.
#[derive(Debug)]
pub struct WebSocketSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PushSession for WebSocketSession {
    async fn recv(&mut self) -> Result<Option<String>, ProtocolError> {
        loop {
            match self.stream.next().await {
                None | Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => tracing::debug!(len = data.len(), "Ignoring non-UTF-8 binary frame"),
                },
                // Ping replies are queued by tungstenite itself
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<(), ProtocolError> {
        tracing::debug!(frame = %frame, "Sending WebSocket frame");
        self.stream.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed");
        }
    }
}
