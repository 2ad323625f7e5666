// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Brightness, Plugin, PluginId, Rotation, ScheduleEntry};

use super::{ChangeSet, StateChange, StatePatch};

/// Mirrored state of an LED matrix device.
///
/// A freshly created state is zeroed: panel off, no rotation, no active
/// plugin, schedule inactive and empty, no plugins. Values only change
/// through [`merge`](Self::merge), which applies a partial update field by
/// field.
///
/// The active plugin is not checked against the plugin list. The two
/// fields may arrive in separate messages, so a short-lived mismatch is
/// expected.
///
/// # Examples
///
/// ```
/// use obegraensad_lib::state::{DeviceState, StatePatch};
/// use obegraensad_lib::types::{Plugin, PluginId};
///
/// let mut state = DeviceState::new();
/// state.merge(
///     &StatePatch::new()
///         .with_plugins(vec![Plugin::new(3, "Snake"), Plugin::new(1, "Draw")])
///         .with_active_plugin(Some(PluginId::new(3))),
/// );
///
/// assert_eq!(state.active_plugin_info().map(|p| p.name.as_str()), Some("Snake"));
/// // Plugins are kept sorted by id
/// assert_eq!(state.plugins()[0].name, "Draw");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Panel brightness (0-255).
    brightness: Brightness,
    /// Display rotation (0-3).
    rotation: Rotation,
    /// Currently running plugin.
    #[serde(rename = "plugin")]
    active_plugin: Option<PluginId>,
    /// Whether the plugin schedule is running.
    schedule_active: bool,
    /// Plugin schedule entries, in device order.
    schedule: Vec<ScheduleEntry>,
    /// Installed plugins, sorted by id.
    #[serde(deserialize_with = "deserialize_plugins")]
    plugins: Vec<Plugin>,
}

impl DeviceState {
    /// Creates a zeroed device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the panel brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Returns `true` if the panel is lit.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.brightness.is_on()
    }

    /// Returns the display rotation.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Returns the active plugin id, if any.
    #[must_use]
    pub fn active_plugin(&self) -> Option<PluginId> {
        self.active_plugin
    }

    /// Returns the active plugin's entry from the plugin list.
    ///
    /// Returns `None` when no plugin is active or the active id is not
    /// (yet) in the list.
    #[must_use]
    pub fn active_plugin_info(&self) -> Option<&Plugin> {
        self.active_plugin.and_then(|id| self.plugin(id))
    }

    /// Returns whether the plugin schedule is running.
    #[must_use]
    pub fn schedule_active(&self) -> bool {
        self.schedule_active
    }

    /// Returns the plugin schedule.
    #[must_use]
    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// Returns the installed plugins, sorted by id.
    #[must_use]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Looks up a plugin by id.
    #[must_use]
    pub fn plugin(&self, id: PluginId) -> Option<&Plugin> {
        self.plugins
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|idx| &self.plugins[idx])
    }

    /// Looks up a plugin by its exact name.
    #[must_use]
    pub fn plugin_by_name(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Applies a partial update and returns what changed.
    ///
    /// Fields absent from `patch` are left untouched. Composite fields are
    /// compared structurally, so re-sending an identical schedule or
    /// plugin list is not reported as a change.
    pub fn merge(&mut self, patch: &StatePatch) -> ChangeSet {
        let mut changes = ChangeSet::new();

        if let Some(brightness) = patch.brightness
            && self.brightness != brightness
        {
            changes.push(StateChange::Brightness(self.brightness));
            self.brightness = brightness;
        }

        if let Some(rotation) = patch.rotation
            && self.rotation != rotation
        {
            changes.push(StateChange::Rotation(self.rotation));
            self.rotation = rotation;
        }

        if let Some(active_plugin) = patch.active_plugin
            && self.active_plugin != active_plugin
        {
            changes.push(StateChange::ActivePlugin(self.active_plugin));
            self.active_plugin = active_plugin;
        }

        if let Some(schedule_active) = patch.schedule_active
            && self.schedule_active != schedule_active
        {
            changes.push(StateChange::ScheduleActive(self.schedule_active));
            self.schedule_active = schedule_active;
        }

        if let Some(schedule) = &patch.schedule
            && &self.schedule != schedule
        {
            let previous = std::mem::replace(&mut self.schedule, schedule.clone());
            changes.push(StateChange::Schedule(previous));
        }

        if let Some(plugins) = &patch.plugins {
            let plugins = normalize_plugins(plugins.clone());
            if self.plugins != plugins {
                let previous = std::mem::replace(&mut self.plugins, plugins);
                changes.push(StateChange::Plugins(previous));
            }
        }

        changes
    }
}

/// Sorts plugins by id and drops duplicate ids, keeping the first seen.
fn normalize_plugins(mut plugins: Vec<Plugin>) -> Vec<Plugin> {
    plugins.sort_by_key(|p| p.id);
    plugins.dedup_by_key(|p| p.id);
    plugins
}

fn deserialize_plugins<'de, D>(deserializer: D) -> Result<Vec<Plugin>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Plugin>::deserialize(deserializer).map(normalize_plugins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateField;

    fn full_patch() -> StatePatch {
        StatePatch::new()
            .with_brightness(Brightness::new(120))
            .with_rotation(Rotation::new(1).unwrap())
            .with_active_plugin(Some(PluginId::new(2)))
            .with_schedule_active(true)
            .with_schedule(vec![ScheduleEntry::new(
                serde_json::json!({"pluginId": 2, "duration": 10}),
            )])
            .with_plugins(vec![Plugin::new(2, "Rain"), Plugin::new(1, "Draw")])
    }

    #[test]
    fn new_state_is_zeroed() {
        let state = DeviceState::new();
        assert_eq!(state.brightness(), Brightness::OFF);
        assert_eq!(state.rotation().value(), 0);
        assert_eq!(state.active_plugin(), None);
        assert!(!state.schedule_active());
        assert!(state.schedule().is_empty());
        assert!(state.plugins().is_empty());
        assert!(!state.is_on());
    }

    #[test]
    fn merge_empty_patch_is_noop() {
        let mut state = DeviceState::new();
        state.merge(&full_patch());
        let before = state.clone();

        let changes = state.merge(&StatePatch::new());

        assert!(changes.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn merge_full_patch_twice_is_idempotent() {
        let mut state = DeviceState::new();

        let first = state.merge(&full_patch());
        let after_first = state.clone();
        let second = state.merge(&full_patch());

        assert_eq!(first.len(), 6);
        assert!(second.is_empty());
        assert_eq!(state, after_first);
    }

    #[test]
    fn merge_reports_prior_values() {
        let mut state = DeviceState::new();
        state.merge(&StatePatch::new().with_brightness(Brightness::new(100)));

        let changes = state.merge(&StatePatch::new().with_brightness(Brightness::new(200)));

        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec![&StateChange::Brightness(Brightness::new(100))]
        );
        assert_eq!(state.brightness().value(), 200);
    }

    #[test]
    fn merge_partial_leaves_other_fields() {
        let mut state = DeviceState::new();
        state.merge(&full_patch());

        let changes = state.merge(&StatePatch::new().with_rotation(Rotation::new(3).unwrap()));

        assert_eq!(changes.fields().collect::<Vec<_>>(), vec![StateField::Rotation]);
        assert_eq!(state.brightness().value(), 120);
        assert_eq!(state.active_plugin(), Some(PluginId::new(2)));
        assert_eq!(state.plugins().len(), 2);
    }

    #[test]
    fn merge_explicit_null_clears_active_plugin() {
        let mut state = DeviceState::new();
        state.merge(&full_patch());

        let changes = state.merge(&StatePatch::new().with_active_plugin(None));

        assert!(changes.contains(StateField::ActivePlugin));
        assert_eq!(state.active_plugin(), None);
    }

    #[test]
    fn plugin_order_does_not_count_as_change() {
        let mut state = DeviceState::new();
        state.merge(&StatePatch::new().with_plugins(vec![
            Plugin::new(1, "Draw"),
            Plugin::new(2, "Rain"),
        ]));

        let changes = state.merge(&StatePatch::new().with_plugins(vec![
            Plugin::new(2, "Rain"),
            Plugin::new(1, "Draw"),
        ]));

        assert!(changes.is_empty());
    }

    #[test]
    fn duplicate_plugin_ids_are_dropped() {
        let mut state = DeviceState::new();
        state.merge(&StatePatch::new().with_plugins(vec![
            Plugin::new(1, "Draw"),
            Plugin::new(1, "Draw again"),
        ]));
        assert_eq!(state.plugins().len(), 1);
    }

    #[test]
    fn active_plugin_may_reference_unknown_id() {
        let mut state = DeviceState::new();
        state.merge(
            &StatePatch::new()
                .with_plugins(vec![Plugin::new(1, "Draw")])
                .with_active_plugin(Some(PluginId::new(7))),
        );
        assert_eq!(state.active_plugin(), Some(PluginId::new(7)));
        assert!(state.active_plugin_info().is_none());
    }

    #[test]
    fn plugin_lookup() {
        let mut state = DeviceState::new();
        state.merge(&full_patch());
        assert_eq!(state.plugin(PluginId::new(1)).unwrap().name, "Draw");
        assert_eq!(state.plugin_by_name("Rain").unwrap().id, PluginId::new(2));
        assert!(state.plugin_by_name("Snake").is_none());
    }

    #[test]
    fn serializes_with_wire_names() {
        let mut state = DeviceState::new();
        state.merge(&full_patch());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["brightness"], 120);
        assert_eq!(json["plugin"], 2);
        assert_eq!(json["scheduleActive"], true);
        assert_eq!(json["plugins"][0]["name"], "Draw");
    }

    #[test]
    fn deserialized_plugins_are_sorted_for_lookup() {
        let state: DeviceState = serde_json::from_value(serde_json::json!({
            "brightness": 10,
            "rotation": 0,
            "plugin": 1,
            "scheduleActive": false,
            "schedule": [],
            "plugins": [
                {"id": 3, "name": "Snake"},
                {"id": 2, "name": "Rain"},
                {"id": 1, "name": "Draw"},
                {"id": 2, "name": "Rain again"}
            ]
        }))
        .unwrap();

        assert_eq!(state.plugins().len(), 3);
        assert_eq!(state.plugin(PluginId::new(1)).unwrap().name, "Draw");
        assert_eq!(state.plugin(PluginId::new(3)).unwrap().name, "Snake");
        assert_eq!(state.active_plugin_info().map(|p| p.name.as_str()), Some("Draw"));
    }
}
