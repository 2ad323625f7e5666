// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for LED matrix control.
//!
//! Each type keeps its value within the range the firmware accepts, so a
//! [`DeviceState`](crate::state::DeviceState) built from them cannot hold
//! an out-of-range brightness or rotation.
//!
//! # Types
//!
//! - [`Brightness`] - Panel brightness (0-255)
//! - [`Rotation`] - Display orientation in quarter turns (0-3)
//! - [`RotateDirection`] - Relative rotate command (`left`/`right`)
//! - [`PluginId`] / [`Plugin`] - Installed display plugins
//! - [`ScheduleEntry`] - Opaque plugin schedule entry

mod brightness;
mod plugin;
mod rotation;
mod schedule;

pub use brightness::Brightness;
pub use plugin::{Plugin, PluginId};
pub use rotation::{RotateDirection, Rotation};
pub use schedule::ScheduleEntry;
