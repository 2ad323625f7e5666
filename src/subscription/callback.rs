// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Internal registry for storing and dispatching callbacks

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::device::ConnectionStatus;
use crate::state::{ChangeSet, DeviceState, StateField};

/// Unique identifier for a subscription.
///
/// This ID is returned when creating a subscription and can be used to
/// unsubscribe later. IDs are unique within a device's lifetime and
/// increase in registration order.
///
/// # Examples
///
/// ```ignore
/// let sub_id = device.subscribe(|state| { /* ... */ });
///
/// // Later, unsubscribe
/// device.unsubscribe(sub_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for full-state listeners.
type StateCallback = Arc<dyn Fn(&DeviceState) + Send + Sync>;

/// Type alias for connection status callbacks.
type StatusCallback = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// Registry for managing device subscription callbacks.
///
/// This is an internal type used by devices to store and dispatch callbacks.
/// It uses thread-safe interior mutability via `parking_lot::RwLock`.
///
/// # Dispatch
///
/// Callbacks are cloned out of the registry before they run, so a callback
/// may subscribe or unsubscribe without deadlocking. A panicking callback is
/// logged and does not prevent the remaining callbacks from running.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Listeners notified on every change.
    state_callbacks: RwLock<BTreeMap<SubscriptionId, StateCallback>>,
    /// Listeners notified only when their field changed.
    field_callbacks: RwLock<BTreeMap<SubscriptionId, (StateField, StateCallback)>>,
    /// Connection status callbacks.
    status_callbacks: RwLock<BTreeMap<SubscriptionId, StatusCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state_callbacks: RwLock::new(BTreeMap::new()),
            field_callbacks: RwLock::new(BTreeMap::new()),
            status_callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a listener called with the full state after every change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener called only when `field` is part of a change.
    pub fn on_field_changed<F>(&self, field: StateField, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.field_callbacks
            .write()
            .insert(id, (field, Arc::new(callback)));
        id
    }

    /// Registers a callback for connection status transitions.
    pub fn on_status_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.status_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state_callbacks.write().remove(&id).is_some()
            || self.field_callbacks.write().remove(&id).is_some()
            || self.status_callbacks.write().remove(&id).is_some()
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Notifies listeners of a merge that produced `changes`.
    ///
    /// Every full-state listener runs once; field listeners run once if any
    /// of their field changed. Listeners run in registration order.
    pub fn dispatch(&self, state: &DeviceState, changes: &ChangeSet) {
        if changes.is_empty() {
            return;
        }

        let mut callbacks: Vec<(SubscriptionId, StateCallback)> = self
            .state_callbacks
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();
        callbacks.extend(
            self.field_callbacks
                .read()
                .iter()
                .filter(|(_, (field, _))| changes.contains(*field))
                .map(|(id, (_, cb))| (*id, Arc::clone(cb))),
        );
        callbacks.sort_by_key(|(id, _)| *id);

        for (id, callback) in callbacks {
            guarded(id, || callback(state));
        }
    }

    /// Notifies status callbacks of a connection transition.
    pub fn dispatch_status(&self, status: ConnectionStatus) {
        let callbacks: Vec<(SubscriptionId, StatusCallback)> = self
            .status_callbacks
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        for (id, callback) in callbacks {
            guarded(id, || callback(status));
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.state_callbacks.read().len()
            + self.field_callbacks.read().len()
            + self.status_callbacks.read().len()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

/// Runs one callback, containing any panic it raises.
fn guarded(id: SubscriptionId, call: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(call)) {
        tracing::error!(
            subscription = %id,
            panic = panic_message(payload.as_ref()),
            "Subscriber panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
