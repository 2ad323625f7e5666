// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] is the mirrored snapshot of the device. Push frames and
//! poll responses are decoded into a [`StatePatch`] and merged into the
//! [`StateCache`], which reports the changed fields as a [`ChangeSet`].
//!
//! # Examples
//!
//! ```
//! use obegraensad_lib::state::{StateCache, StatePatch};
//! use obegraensad_lib::types::Rotation;
//!
//! let cache = StateCache::new();
//! cache.merge(&StatePatch::new().with_rotation(Rotation::new(2).unwrap()));
//!
//! assert_eq!(cache.read().rotation().value(), 2);
//! ```

mod cache;
mod device_state;
mod state_change;

pub use cache::StateCache;
pub use device_state::DeviceState;
pub use state_change::{ChangeSet, StateChange, StateField, StatePatch};
