// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `obegraensad_lib` - A Rust library to mirror and control OBEGRÄNSAD LED
//! matrices running the community firmware.
//!
//! The library keeps a live, thread-safe copy of the device state and sends
//! commands back to it.
//!
//! # Features
//!
//! - **Push updates**: a WebSocket session at `ws://<host>/ws`, reconnected
//!   forever with a fixed delay
//! - **Polling fallback**: `GET /api/info` on a timer, once per new
//!   session, and shortly after every command
//! - **State cache**: consistent snapshots, merged field by field
//! - **Subscriptions**: callbacks on state changes and connection status
//! - **Commands**: brightness, plugin, rotate and schedule, validated
//!   before anything is sent
//!
//! # Quick Start
//!
//! ```no_run
//! use obegraensad_lib::Device;
//! use obegraensad_lib::subscription::Subscribable;
//! use obegraensad_lib::types::RotateDirection;
//!
//! #[tokio::main]
//! async fn main() -> obegraensad_lib::Result<()> {
//!     let device = Device::builder("192.168.5.60").build()?;
//!
//!     device.subscribe(|state| {
//!         println!("Brightness: {}", state.brightness());
//!     });
//!
//!     device.start()?;
//!
//!     // Untyped commands are validated before any I/O
//!     device.dispatch("brightness", &serde_json::json!(128)).await?;
//!     device.rotate(RotateDirection::Right).await?;
//!
//!     println!("{:?}", device.state());
//!
//!     device.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `http` (default): the [`HttpClient`](protocol::HttpClient) poll transport
//! - `websocket` (default): the [`WebSocketConnector`](protocol::WebSocketConnector)
//!   push transport
//!
//! [`Device::builder`] requires both. Without them, plug your own transports
//! into [`Device::with_transports`].

pub mod command;
pub mod device;
pub mod error;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use command::Command;
#[cfg(all(feature = "http", feature = "websocket"))]
pub use device::DeviceBuilder;
pub use device::{ConnectionStatus, Device, DeviceConfig};
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use state::{ChangeSet, DeviceState, StateCache, StateField, StatePatch};
pub use subscription::{Subscribable, SubscriptionId};
pub use types::{Brightness, Plugin, PluginId, RotateDirection, Rotation, ScheduleEntry};
