// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schedule entries.

use serde::{Deserialize, Serialize};

/// One entry of the device's plugin schedule.
///
/// The library does not interpret schedule entries; they are kept as the
/// JSON the firmware reported and compared structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleEntry(serde_json::Value);

impl ScheduleEntry {
    /// Wraps a raw JSON schedule entry.
    #[must_use]
    pub fn new(raw: serde_json::Value) -> Self {
        Self(raw)
    }

    /// Returns the raw JSON entry.
    #[must_use]
    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    /// Returns an integer attribute of the entry, if present.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(serde_json::Value::as_i64)
    }
}

impl From<serde_json::Value> for ScheduleEntry {
    fn from(raw: serde_json::Value) -> Self {
        Self(raw)
    }
}
