// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display rotation types.
//!
//! The device reports its orientation as a quarter-turn count (0-3) and
//! accepts relative `left`/`right` rotate commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Display orientation in quarter turns (0-3).
///
/// # Examples
///
/// ```
/// use obegraensad_lib::types::Rotation;
///
/// let r = Rotation::new(2).unwrap();
/// assert_eq!(r.value(), 2);
/// assert_eq!(r.degrees(), 180);
/// assert!(Rotation::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    /// Highest valid quarter-turn count.
    pub const MAX: u8 = 3;

    /// Creates a rotation value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` exceeds 3.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i64::from(Self::MAX),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the quarter-turn count.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub fn degrees(&self) -> u16 {
        u16::from(self.0) * 90
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl TryFrom<u8> for Rotation {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let out_of_range = || ValueError::OutOfRange {
            min: 0,
            max: i64::from(Self::MAX),
            actual: value,
        };
        u8::try_from(value)
            .map_err(|_| out_of_range())
            .and_then(Self::new)
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

/// Direction for a relative rotate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    /// Rotate counter-clockwise.
    Left,
    /// Rotate clockwise.
    Right,
}

impl RotateDirection {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for RotateDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotateDirection {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(ValueError::InvalidDirection(other.to_string())),
        }
    }
}
