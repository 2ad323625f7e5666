// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for handles that publish state changes.

use crate::device::ConnectionStatus;
use crate::state::{DeviceState, StateField};
use crate::subscription::SubscriptionId;

/// Trait for types that support event subscriptions.
///
/// # Examples
///
/// ```no_run
/// use obegraensad_lib::Device;
/// use obegraensad_lib::state::StateField;
/// use obegraensad_lib::subscription::Subscribable;
///
/// # async fn example() -> obegraensad_lib::Result<()> {
/// let device = Device::builder("192.168.5.60").build()?;
///
/// let sub_id = device.subscribe(|state| {
///     println!("Brightness is now {}", state.brightness());
/// });
///
/// device.on_field_changed(StateField::ActivePlugin, |state| {
///     println!("Plugin: {:?}", state.active_plugin_info().map(|p| &p.name));
/// });
///
/// device.start()?;
///
/// // Unsubscribe when no longer needed
/// device.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to state changes.
    ///
    /// The callback runs once per merge that changed at least one field and
    /// receives the full state after the merge.
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static;

    /// Subscribes to changes of a single field.
    fn on_field_changed<F>(&self, field: StateField, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static;

    /// Subscribes to connection status transitions.
    ///
    /// The callback runs only when the status actually changes.
    fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
