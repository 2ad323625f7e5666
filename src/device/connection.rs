// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push connection lifecycle.
//!
//! One long-lived task owns the push session. It connects, runs the
//! session until it ends, waits the reconnect delay and starts over, until
//! the device is stopped:
//!
//! ```text
//! Disconnected -> Connecting -> Live -> Disconnected -> Connecting -> ...
//!                     |                      ^
//!                     +---- failed ----------+
//! ```
//!
//! Commands reach the session through a channel created per session, so a
//! frame is never written to a stale connection.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::Shared;
use crate::error::ProtocolError;
use crate::protocol::{PushConnector, PushSession, StateSource};

/// Pending commands per session.
const OUTBOUND_CAPACITY: usize = 16;

/// Lifecycle status of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ConnectionStatus {
    /// No push session. Polling still runs.
    #[default]
    Disconnected = 0,
    /// A handshake is in progress.
    Connecting = 1,
    /// The push session is open and commands can be sent.
    Live = 2,
}

impl ConnectionStatus {
    /// Returns `true` if commands can be sent.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    /// Returns the status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Live => "live",
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Live,
            _ => Self::Disconnected,
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame waiting to be written, with the channel for its write result.
#[derive(Debug)]
pub(crate) struct Outbound {
    pub(crate) frame: String,
    pub(crate) ack: oneshot::Sender<Result<(), ProtocolError>>,
}

/// Runs the connect/session/reconnect loop until `cancel` fires.
pub(crate) async fn run<C, S>(shared: Arc<Shared<C, S>>, cancel: CancellationToken)
where
    C: PushConnector,
    S: StateSource,
{
    let config = &shared.config;

    loop {
        shared.set_status(ConnectionStatus::Connecting);
        tracing::debug!(url = %config.ws_url(), "Connecting push channel");

        let attempt = tokio::time::timeout(config.connect_timeout(), shared.connector.connect());
        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = attempt => result,
        };

        match result {
            Ok(Ok(session)) => {
                tracing::info!(host = %config.host(), "Push channel connected");
                run_session(&shared, session, &cancel).await;
            }
            Ok(Err(e)) => {
                tracing::warn!(host = %config.host(), error = %e, "Push connection failed");
            }
            Err(_) => {
                tracing::warn!(
                    host = %config.host(),
                    timeout = ?config.connect_timeout(),
                    "Push connection timed out"
                );
            }
        }

        shared.set_status(ConnectionStatus::Disconnected);

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(config.reconnect_delay()) => {}
        }
    }

    shared.set_status(ConnectionStatus::Disconnected);
    tracing::debug!(host = %config.host(), "Connection task stopped");
}

/// Drives one live session until it ends or `cancel` fires.
async fn run_session<C, S>(shared: &Shared<C, S>, mut session: C::Session, cancel: &CancellationToken)
where
    C: PushConnector,
    S: StateSource,
{
    let (tx, mut rx) = mpsc::channel::<Outbound>(OUTBOUND_CAPACITY);

    shared.last_seen.lock().take();
    *shared.outbound.lock() = Some(tx);
    shared.set_status(ConnectionStatus::Live);

    // Baseline snapshot for the new session
    tokio::select! {
        () = cancel.cancelled() => {}
        result = shared.poll() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Baseline poll failed");
            }
        }
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            frame = session.recv() => match frame {
                Ok(Some(text)) => shared.handle_frame(&text),
                Ok(None) => {
                    tracing::info!(host = %shared.config.host(), "Push channel closed by device");
                    break;
                }
                Err(e) => {
                    tracing::warn!(host = %shared.config.host(), error = %e, "Push channel read failed");
                    break;
                }
            },

            Some(outbound) = rx.recv() => {
                let limit = shared.config.connect_timeout();
                let written = tokio::time::timeout(limit, session.send(outbound.frame))
                    .await
                    .unwrap_or(Err(ProtocolError::timeout(limit)));
                match written {
                    Ok(()) => {
                        let _ = outbound.ack.send(Ok(()));
                    }
                    Err(e) => {
                        tracing::warn!(host = %shared.config.host(), error = %e, "Push channel write failed");
                        let _ = outbound.ack.send(Err(e));
                        break;
                    }
                }
            }
        }
    }

    // Queued commands see their ack dropped and report NotConnected
    shared.outbound.lock().take();
    drop(rx);

    if tokio::time::timeout(shared.config.connect_timeout(), session.close())
        .await
        .is_err()
    {
        tracing::debug!("Push channel close timed out");
    }
}

impl<C, S> Shared<C, S>
where
    C: PushConnector,
    S: StateSource,
{
    fn handle_frame(&self, text: &str) {
        *self.last_seen.lock() = Some(Instant::now());

        match crate::protocol::codec::decode(text) {
            Ok(patch) => {
                self.apply(&patch);
            }
            Err(e) => {
                tracing::warn!(error = %e, frame = %text, "Dropping undecodable push frame");
            }
        }
    }
}
