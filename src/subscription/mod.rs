// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for device state changes.
//!
//! Push frames and poll results both end in one merge step. Whenever a
//! merge changes at least one field, every subscriber is called with the
//! resulting state.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Internal registry that manages callbacks and dispatches events
//! - [`Subscribable`] - Trait for types that support event subscriptions
//!
//! # Guarantees
//!
//! - Notifications are serialized per device: no subscriber runs
//!   concurrently with itself or with a later batch.
//! - A merge that changes nothing notifies nobody.
//! - A panicking subscriber is logged and skipped.
//! - Once the device is stopped, no subscriber is called.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
