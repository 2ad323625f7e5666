// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire codec for device payloads.
//!
//! Push frames and `/api/info` responses share one JSON shape, any subset
//! of:
//!
//! ```json
//! {"brightness": 128, "rotation": 2, "plugin": 3, "scheduleActive": false,
//!  "schedule": [...], "plugins": [{"id": 3, "name": "Snake"}]}
//! ```
//!
//! Decoding is permissive. Unknown keys are ignored, and a known key with a
//! bad value is skipped on its own without failing the rest of the payload.
//! Only a payload that is not a JSON object is an error.

use serde_json::{Map, Value};

use crate::command::Command;
use crate::error::ParseError;
use crate::state::{StateField, StatePatch};
use crate::types::{Brightness, Plugin, PluginId, Rotation, ScheduleEntry};

/// Decodes a device payload into a partial state update.
///
/// # Errors
///
/// Returns `ParseError::Json` for invalid JSON and
/// `ParseError::UnexpectedFormat` if the payload is not a JSON object.
///
/// # Examples
///
/// ```
/// use obegraensad_lib::protocol::codec;
///
/// let patch = codec::decode(r#"{"rotation": 2, "unknown": true}"#).unwrap();
/// assert_eq!(patch.rotation.map(|r| r.value()), Some(2));
/// assert!(patch.brightness.is_none());
///
/// assert!(codec::decode("not json").is_err());
/// ```
pub fn decode(raw: &str) -> Result<StatePatch, ParseError> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(map) => Ok(decode_object(&map)),
        other => Err(ParseError::UnexpectedFormat(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Encodes a command as an outbound WebSocket frame.
///
/// # Errors
///
/// Returns `ParseError::Json` if serialization fails.
///
/// # Examples
///
/// ```
/// use obegraensad_lib::command::Command;
/// use obegraensad_lib::protocol::codec;
/// use obegraensad_lib::types::Brightness;
///
/// let frame = codec::encode(&Command::brightness(Brightness::new(128))).unwrap();
/// assert_eq!(frame, r#"{"event":"brightness","brightness":128}"#);
/// ```
pub fn encode(command: &Command) -> Result<String, ParseError> {
    serde_json::to_string(command).map_err(ParseError::Json)
}

fn decode_object(map: &Map<String, Value>) -> StatePatch {
    let mut patch = StatePatch::new();

    if let Some(value) = map.get(StateField::Brightness.wire_name()) {
        patch.brightness = field(StateField::Brightness, value, |v| {
            v.as_i64().and_then(|n| Brightness::try_from(n).ok())
        });
    }

    if let Some(value) = map.get(StateField::Rotation.wire_name()) {
        patch.rotation = field(StateField::Rotation, value, |v| {
            v.as_i64().and_then(|n| Rotation::try_from(n).ok())
        });
    }

    if let Some(value) = map.get(StateField::ActivePlugin.wire_name()) {
        patch.active_plugin = field(StateField::ActivePlugin, value, |v| match v {
            Value::Null => Some(None),
            other => other
                .as_i64()
                .and_then(|n| PluginId::try_from(n).ok())
                .map(Some),
        });
    }

    if let Some(value) = map.get(StateField::ScheduleActive.wire_name()) {
        patch.schedule_active = field(StateField::ScheduleActive, value, |v| match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            _ => None,
        });
    }

    if let Some(value) = map.get(StateField::Schedule.wire_name()) {
        patch.schedule = field(StateField::Schedule, value, |v| {
            v.as_array()
                .map(|entries| entries.iter().cloned().map(ScheduleEntry::new).collect())
        });
    }

    if let Some(value) = map.get(StateField::Plugins.wire_name()) {
        patch.plugins = field(StateField::Plugins, value, |v| {
            serde_json::from_value::<Vec<Plugin>>(v.clone()).ok()
        });
    }

    patch
}

/// Converts one field, logging and skipping it if the value is unusable.
fn field<T>(name: StateField, value: &Value, convert: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
    let converted = convert(value);
    if converted.is_none() {
        tracing::debug!(field = %name, value = %value, "Ignoring invalid field value");
    }
    converted
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RotateDirection;

    #[test]
    fn decode_full_snapshot() {
        let raw = r#"{
            "brightness": 200,
            "rotation": 1,
            "plugin": 3,
            "scheduleActive": true,
            "schedule": [{"pluginId": 3, "duration": 60}],
            "plugins": [{"id": 3, "name": "Snake"}, {"id": 1, "name": "Draw"}],
            "rows": 16,
            "cols": 16
        }"#;

        let patch = decode(raw).unwrap();

        assert_eq!(patch.brightness, Some(Brightness::new(200)));
        assert_eq!(patch.rotation, Some(Rotation::new(1).unwrap()));
        assert_eq!(patch.active_plugin, Some(Some(PluginId::new(3))));
        assert_eq!(patch.schedule_active, Some(true));
        assert_eq!(patch.schedule.as_ref().map(Vec::len), Some(1));
        assert_eq!(patch.plugins.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn decode_empty_object() {
        assert!(decode("{}").unwrap().is_empty());
    }

    #[test]
    fn decode_invalid_json() {
        assert!(matches!(decode("{brightness"), Err(ParseError::Json(_))));
    }

    #[test]
    fn decode_non_object() {
        assert!(matches!(
            decode("[1, 2]"),
            Err(ParseError::UnexpectedFormat(_))
        ));
        assert!(matches!(decode("42"), Err(ParseError::UnexpectedFormat(_))));
    }

    #[test]
    fn decode_skips_out_of_range_fields() {
        let patch = decode(r#"{"brightness": 300, "rotation": 7, "plugin": 2}"#).unwrap();
        assert!(patch.brightness.is_none());
        assert!(patch.rotation.is_none());
        assert_eq!(patch.active_plugin, Some(Some(PluginId::new(2))));
    }

    #[test]
    fn decode_skips_wrong_types() {
        let patch = decode(
            r#"{"brightness": "high", "scheduleActive": "yes", "schedule": {}, "plugins": [{"id": "x"}]}"#,
        )
        .unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn decode_null_plugin_clears() {
        let patch = decode(r#"{"plugin": null}"#).unwrap();
        assert_eq!(patch.active_plugin, Some(None));
    }

    #[test]
    fn decode_numeric_schedule_flag() {
        assert_eq!(
            decode(r#"{"scheduleActive": 1}"#).unwrap().schedule_active,
            Some(true)
        );
        assert_eq!(
            decode(r#"{"scheduleActive": 0}"#).unwrap().schedule_active,
            Some(false)
        );
        assert!(
            decode(r#"{"scheduleActive": 2}"#)
                .unwrap()
                .schedule_active
                .is_none()
        );
    }

    #[test]
    fn encode_frames() {
        assert_eq!(
            encode(&Command::rotate(RotateDirection::Left)).unwrap(),
            r#"{"event":"rotate","direction":"left"}"#
        );
        assert_eq!(
            encode(&Command::plugin(PluginId::new(3))).unwrap(),
            r#"{"event":"plugin","plugin":3}"#
        );
        assert_eq!(
            encode(&Command::schedule_active(true)).unwrap(),
            r#"{"event":"scheduleActive","scheduleActive":true}"#
        );
    }
}
