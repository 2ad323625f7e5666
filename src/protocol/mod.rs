// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementations for communicating with the LED matrix.
//!
//! The device speaks two channels:
//!
//! - a **push** channel, a WebSocket at `ws://<host>/ws` that streams state
//!   changes and accepts commands ([`WebSocketConnector`])
//! - a **poll** channel, `GET http://<host>/api/info`, returning a full
//!   state snapshot ([`HttpClient`])
//!
//! Both are reached through small traits, [`PushConnector`] /
//! [`PushSession`] and [`StateSource`], so the synchronization core can run
//! against in-memory transports in tests.
//!
//! The [`codec`] module converts between payloads and state patches.

pub mod codec;
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "websocket")]
mod websocket;

use std::future::Future;

#[cfg(feature = "http")]
pub use http::HttpClient;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnector, WebSocketSession};

use crate::error::ProtocolError;

/// Opens push sessions to the device.
pub trait PushConnector: Send + Sync + 'static {
    /// The session type produced by a successful handshake.
    type Session: PushSession;

    /// Performs the transport handshake.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the device cannot be reached or rejects the
    /// handshake.
    fn connect(&self) -> impl Future<Output = Result<Self::Session, ProtocolError>> + Send;
}

/// An established push session.
///
/// A session is owned by a single task; reads and writes never overlap.
pub trait PushSession: Send + 'static {
    /// Waits for the next inbound text frame.
    ///
    /// Returns `Ok(None)` once the device closes the connection. The future
    /// must be cancel-safe: dropping it before completion loses no frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on a transport read failure.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, ProtocolError>> + Send;

    /// Writes one text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on a transport write failure.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the session, ignoring errors.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fetches full state snapshots over the stateless channel.
pub trait StateSource: Send + Sync + 'static {
    /// Requests the device's current state and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on network failure, timeout, or a
    /// non-success status.
    fn fetch(&self) -> impl Future<Output = Result<String, ProtocolError>> + Send;
}
