// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Handle (azimuth, elevation) coordinates.
*/

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A struct containing an Azimuth and Elevation. All units are in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AzEl {
    /// Azimuth [radians]
    pub az: f64,
    /// Elevation [radians]
    pub el: f64,
}

impl AzEl {
    /// Make a new `AzEl` struct from values in radians.
    pub fn new(az: f64, el: f64) -> Self {
        Self { az, el }
    }

    /// Make a new `AzEl` struct from values in degrees.
    pub fn new_degrees(az: f64, el: f64) -> Self {
        Self::new(az.to_radians(), el.to_radians())
    }

    /// Get the zenith angle \[radians\].
    pub fn za(&self) -> f64 {
        std::f64::consts::FRAC_PI_2 - self.el
    }
}

impl From<AzEl> for Direction {
    fn from(azel: AzEl) -> Self {
        Direction::new(azel.az, azel.el)
    }
}

impl From<Direction> for AzEl {
    fn from(d: Direction) -> Self {
        AzEl::new(d.lon, d.lat)
    }
}

impl std::fmt::Display for AzEl {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}°, {}°)", self.az.to_degrees(), self.el.to_degrees())
    }
}
