// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for the LED matrix.
//!
//! The device uses the full 0-255 range, where 0 turns the panel off.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Panel brightness (0-255).
///
/// Every `u8` is a valid brightness, so construction from `u8` is
/// infallible. Wider integers, as found in JSON payloads, go through
/// [`TryFrom<i64>`].
///
/// # Examples
///
/// ```
/// use obegraensad_lib::types::Brightness;
///
/// let b = Brightness::new(128);
/// assert_eq!(b.value(), 128);
/// assert!(b.is_on());
///
/// assert!(Brightness::try_from(256_i64).is_err());
/// assert!(Brightness::try_from(-1_i64).is_err());
/// assert!(!Brightness::OFF.is_on());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    /// Panel off.
    pub const OFF: Self = Self(0);

    /// Full brightness.
    pub const MAX: Self = Self(255);

    /// Creates a brightness value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw brightness value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if the panel is lit.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| ValueError::OutOfRange {
                min: 0,
                max: 255,
                actual: value,
            })
    }
}
