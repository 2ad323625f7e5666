// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State patches and change sets.
//!
//! A [`StatePatch`] is a partial update decoded from a push frame or a poll
//! response: every field is optional and absent fields leave the cached
//! value alone. Merging a patch yields a [`ChangeSet`] listing the prior
//! value of every field that actually changed.
//!
//! # Examples
//!
//! ```
//! use obegraensad_lib::state::{DeviceState, StateField, StatePatch};
//! use obegraensad_lib::types::Brightness;
//!
//! let mut state = DeviceState::new();
//! let patch = StatePatch::new().with_brightness(Brightness::new(80));
//!
//! let changes = state.merge(&patch);
//! assert!(changes.contains(StateField::Brightness));
//!
//! // Merging the same patch again changes nothing
//! assert!(state.merge(&patch).is_empty());
//! ```

use std::fmt;

use crate::types::{Brightness, Plugin, PluginId, Rotation, ScheduleEntry};

/// A partial device state update.
///
/// `active_plugin` is doubly optional: `None` means the field was absent,
/// `Some(None)` means the device reported no active plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    /// New brightness, if reported.
    pub brightness: Option<Brightness>,
    /// New rotation, if reported.
    pub rotation: Option<Rotation>,
    /// New active plugin, if reported.
    pub active_plugin: Option<Option<PluginId>>,
    /// New schedule activation flag, if reported.
    pub schedule_active: Option<bool>,
    /// New schedule, if reported.
    pub schedule: Option<Vec<ScheduleEntry>>,
    /// New plugin list, if reported.
    pub plugins: Option<Vec<Plugin>>,
}

impl StatePatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none()
            && self.rotation.is_none()
            && self.active_plugin.is_none()
            && self.schedule_active.is_none()
            && self.schedule.is_none()
            && self.plugins.is_none()
    }

    /// Sets the brightness field.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets the rotation field.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Sets the active plugin field.
    #[must_use]
    pub fn with_active_plugin(mut self, plugin: Option<PluginId>) -> Self {
        self.active_plugin = Some(plugin);
        self
    }

    /// Sets the schedule activation field.
    #[must_use]
    pub fn with_schedule_active(mut self, active: bool) -> Self {
        self.schedule_active = Some(active);
        self
    }

    /// Sets the schedule field.
    #[must_use]
    pub fn with_schedule(mut self, schedule: Vec<ScheduleEntry>) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Sets the plugin list field.
    #[must_use]
    pub fn with_plugins(mut self, plugins: Vec<Plugin>) -> Self {
        self.plugins = Some(plugins);
        self
    }
}

/// Identifies one field of [`DeviceState`](super::DeviceState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    /// Panel brightness.
    Brightness,
    /// Display rotation.
    Rotation,
    /// Active plugin id.
    ActivePlugin,
    /// Schedule activation flag.
    ScheduleActive,
    /// Plugin schedule.
    Schedule,
    /// Installed plugins.
    Plugins,
}

impl StateField {
    /// Returns the field's key in device payloads.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Rotation => "rotation",
            Self::ActivePlugin => "plugin",
            Self::ScheduleActive => "scheduleActive",
            Self::Schedule => "schedule",
            Self::Plugins => "plugins",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single field change, carrying the value the field held before.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Brightness changed; holds the previous brightness.
    Brightness(Brightness),
    /// Rotation changed; holds the previous rotation.
    Rotation(Rotation),
    /// Active plugin changed; holds the previous active plugin.
    ActivePlugin(Option<PluginId>),
    /// Schedule activation changed; holds the previous flag.
    ScheduleActive(bool),
    /// Schedule changed; holds the previous schedule.
    Schedule(Vec<ScheduleEntry>),
    /// Plugin list changed; holds the previous list.
    Plugins(Vec<Plugin>),
}

impl StateChange {
    /// Returns the field this change applies to.
    #[must_use]
    pub const fn field(&self) -> StateField {
        match self {
            Self::Brightness(_) => StateField::Brightness,
            Self::Rotation(_) => StateField::Rotation,
            Self::ActivePlugin(_) => StateField::ActivePlugin,
            Self::ScheduleActive(_) => StateField::ScheduleActive,
            Self::Schedule(_) => StateField::Schedule,
            Self::Plugins(_) => StateField::Plugins,
        }
    }
}

/// The fields changed by one merge, with their prior values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<StateChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if `field` changed.
    #[must_use]
    pub fn contains(&self, field: StateField) -> bool {
        self.changes.iter().any(|c| c.field() == field)
    }

    /// Returns the changed fields in merge order.
    pub fn fields(&self) -> impl Iterator<Item = StateField> + '_ {
        self.changes.iter().map(StateChange::field)
    }

    /// Returns the changes (prior values) in merge order.
    pub fn iter(&self) -> impl Iterator<Item = &StateChange> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a StateChange;
    type IntoIter = std::slice::Iter<'a, StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch() {
        assert!(StatePatch::new().is_empty());
        assert!(!StatePatch::new().with_schedule_active(true).is_empty());
    }

    #[test]
    fn explicit_null_plugin_is_not_empty() {
        let patch = StatePatch::new().with_active_plugin(None);
        assert!(!patch.is_empty());
        assert_eq!(patch.active_plugin, Some(None));
    }

    #[test]
    fn change_field_mapping() {
        assert_eq!(
            StateChange::Brightness(Brightness::OFF).field(),
            StateField::Brightness
        );
        assert_eq!(
            StateChange::Plugins(Vec::new()).field(),
            StateField::Plugins
        );
    }

    #[test]
    fn change_set_queries() {
        let mut set = ChangeSet::new();
        assert!(set.is_empty());

        set.push(StateChange::Rotation(Rotation::default()));
        set.push(StateChange::ScheduleActive(false));

        assert_eq!(set.len(), 2);
        assert!(set.contains(StateField::Rotation));
        assert!(!set.contains(StateField::Brightness));
        assert_eq!(
            set.fields().collect::<Vec<_>>(),
            vec![StateField::Rotation, StateField::ScheduleActive]
        );
    }

    #[test]
    fn field_wire_names() {
        assert_eq!(StateField::ActivePlugin.to_string(), "plugin");
        assert_eq!(StateField::ScheduleActive.wire_name(), "scheduleActive");
    }
}
