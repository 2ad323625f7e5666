// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lock-guarded device state cache.

use parking_lot::RwLock;

use super::{ChangeSet, DeviceState, StatePatch};

/// Single source of truth for the mirrored device state.
///
/// Reads return an owned snapshot, so callers never observe a merge in
/// progress. Reads may run concurrently with each other; merges take the
/// lock exclusively.
///
/// # Examples
///
/// ```
/// use obegraensad_lib::state::{StateCache, StatePatch};
/// use obegraensad_lib::types::Brightness;
///
/// let cache = StateCache::new();
/// let changes = cache.merge(&StatePatch::new().with_brightness(Brightness::new(10)));
///
/// assert_eq!(changes.len(), 1);
/// assert_eq!(cache.read().brightness().value(), 10);
/// ```
#[derive(Debug, Default)]
pub struct StateCache {
    state: RwLock<DeviceState>,
}

impl StateCache {
    /// Creates a cache holding a zeroed state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn read(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Merges a partial update and returns the prior value of every field
    /// that changed.
    pub fn merge(&self, patch: &StatePatch) -> ChangeSet {
        if patch.is_empty() {
            return ChangeSet::new();
        }
        self.state.write().merge(patch)
    }
}
