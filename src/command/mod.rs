// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! LED matrix command definitions.
//!
//! The firmware accepts a fixed set of commands over the WebSocket, each a
//! JSON object tagged by its `event` name:
//!
//! | Command | Event | Example frame |
//! |---------|-------|---------------|
//! | [`Command::Brightness`] | `brightness` | `{"event":"brightness","brightness":128}` |
//! | [`Command::Plugin`] | `plugin` | `{"event":"plugin","plugin":3}` |
//! | [`Command::Rotate`] | `rotate` | `{"event":"rotate","direction":"left"}` |
//! | [`Command::ScheduleActive`] | `scheduleActive` | `{"event":"scheduleActive","scheduleActive":true}` |
//!
//! A `Command` can only hold valid parameters. Untyped input, such as a
//! name and a JSON value coming from an automation, goes through
//! [`Command::parse`], which rejects anything outside the allow-list before
//! any I/O happens.
//!
//! # Examples
//!
//! ```
//! use obegraensad_lib::command::Command;
//! use obegraensad_lib::types::RotateDirection;
//!
//! let cmd = Command::parse("rotate", &serde_json::json!("left")).unwrap();
//! assert_eq!(cmd, Command::rotate(RotateDirection::Left));
//! assert_eq!(cmd.name(), "rotate");
//!
//! assert!(Command::parse("brightness", &serde_json::json!(300)).is_err());
//! assert!(Command::parse("reboot", &serde_json::Value::Null).is_err());
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::ValueError;
use crate::types::{Brightness, PluginId, RotateDirection};

/// A command that can be sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum Command {
    /// Set the panel brightness.
    #[serde(rename = "brightness")]
    Brightness {
        /// Target brightness.
        brightness: Brightness,
    },

    /// Switch to another plugin.
    #[serde(rename = "plugin")]
    Plugin {
        /// Plugin to activate.
        plugin: PluginId,
    },

    /// Rotate the display by a quarter turn.
    #[serde(rename = "rotate")]
    Rotate {
        /// Rotation direction.
        direction: RotateDirection,
    },

    /// Enable or disable the plugin schedule.
    #[serde(rename = "scheduleActive")]
    ScheduleActive {
        /// Whether the schedule should run.
        #[serde(rename = "scheduleActive")]
        schedule_active: bool,
    },
}

impl Command {
    /// Event names the device accepts.
    pub const EVENTS: [&'static str; 4] = ["brightness", "plugin", "rotate", "scheduleActive"];

    /// Creates a brightness command.
    #[must_use]
    pub const fn brightness(brightness: Brightness) -> Self {
        Self::Brightness { brightness }
    }

    /// Creates a plugin switch command.
    #[must_use]
    pub const fn plugin(plugin: PluginId) -> Self {
        Self::Plugin { plugin }
    }

    /// Creates a rotate command.
    #[must_use]
    pub const fn rotate(direction: RotateDirection) -> Self {
        Self::Rotate { direction }
    }

    /// Creates a schedule activation command.
    #[must_use]
    pub const fn schedule_active(schedule_active: bool) -> Self {
        Self::ScheduleActive { schedule_active }
    }

    /// Returns the command's event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Brightness { .. } => "brightness",
            Self::Plugin { .. } => "plugin",
            Self::Rotate { .. } => "rotate",
            Self::ScheduleActive { .. } => "scheduleActive",
        }
    }

    /// Builds a command from an event name and untyped parameters.
    ///
    /// `params` may be the bare value (`128`, `"left"`, `true`), an object
    /// keyed by the wire parameter name (`{"direction": "left"}`), or an
    /// object with a `value` key (`{"value": 128}`).
    ///
    /// # Errors
    ///
    /// - `ValueError::UnknownCommand` if `name` is not an accepted event
    /// - `ValueError::OutOfRange` for a brightness outside 0-255 or a
    ///   negative plugin id
    /// - `ValueError::InvalidDirection` for a direction other than
    ///   `left`/`right`
    /// - `ValueError::InvalidParameter` if the parameter is missing or has
    ///   the wrong JSON type
    pub fn parse(name: &str, params: &Value) -> Result<Self, ValueError> {
        match name {
            "brightness" => {
                let value = integer_param(name, "brightness", params)?;
                Ok(Self::brightness(Brightness::try_from(value)?))
            }
            "plugin" => {
                let value = integer_param(name, "plugin", params)?;
                Ok(Self::plugin(PluginId::try_from(value)?))
            }
            "rotate" => {
                let value = param(name, "direction", params)?;
                let direction = value.as_str().ok_or_else(|| ValueError::InvalidParameter {
                    command: name.to_string(),
                    message: format!("expected a direction string, got {value}"),
                })?;
                Ok(Self::rotate(direction.parse()?))
            }
            "scheduleActive" => {
                let value = param(name, "scheduleActive", params)?;
                let active = value.as_bool().ok_or_else(|| ValueError::InvalidParameter {
                    command: name.to_string(),
                    message: format!("expected a boolean, got {value}"),
                })?;
                Ok(Self::schedule_active(active))
            }
            other => Err(ValueError::UnknownCommand(other.to_string())),
        }
    }
}

/// Extracts the parameter value for `command`.
fn param<'a>(command: &str, key: &str, params: &'a Value) -> Result<&'a Value, ValueError> {
    match params {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.get("value"))
            .ok_or_else(|| ValueError::InvalidParameter {
                command: command.to_string(),
                message: format!("missing `{key}`"),
            }),
        Value::Null => Err(ValueError::InvalidParameter {
            command: command.to_string(),
            message: format!("missing `{key}`"),
        }),
        other => Ok(other),
    }
}

fn integer_param(command: &str, key: &str, params: &Value) -> Result<i64, ValueError> {
    let value = param(command, key, params)?;
    value.as_i64().ok_or_else(|| ValueError::InvalidParameter {
        command: command.to_string(),
        message: format!("expected an integer, got {value}"),
    })
}
