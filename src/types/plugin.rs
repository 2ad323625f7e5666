// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plugin (display effect) identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Identifier of a plugin installed on the device.
///
/// # Examples
///
/// ```
/// use obegraensad_lib::types::PluginId;
///
/// let id = PluginId::new(9);
/// assert_eq!(id.value(), 9);
/// assert!(PluginId::try_from(-3_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(u32);

impl PluginId {
    /// Creates a plugin identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PluginId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl TryFrom<i64> for PluginId {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| ValueError::OutOfRange {
                min: 0,
                max: i64::from(u32::MAX),
                actual: value,
            })
    }
}

/// A plugin advertised by the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin identifier, used by the `plugin` command.
    pub id: PluginId,
    /// Name reported by the firmware.
    pub name: String,
}

impl Plugin {
    /// Creates a plugin entry.
    #[must_use]
    pub fn new(id: impl Into<PluginId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_id_conversion() {
        assert_eq!(PluginId::try_from(3_i64).unwrap(), PluginId::new(3));
        assert!(PluginId::try_from(-1_i64).is_err());
        assert!(PluginId::try_from(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn plugin_deserialize() {
        let plugin: Plugin = serde_json::from_str(r#"{"id":4,"name":"Snake"}"#).unwrap();
        assert_eq!(plugin, Plugin::new(4, "Snake"));
    }

    #[test]
    fn plugin_deserialize_ignores_extra_fields() {
        let plugin: Plugin =
            serde_json::from_str(r#"{"id":1,"name":"Draw","hidden":false}"#).unwrap();
        assert_eq!(plugin.id.value(), 1);
    }
}
