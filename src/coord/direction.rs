// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Generic spherical directions, and points on a plane tangent to the sphere.
 */

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A direction on the sphere. All units are in radians.
///
/// `lon` may be azimuth, right ascension or geodetic longitude and can take
/// any value. `lat` may be elevation, declination or geodetic latitude and
/// should lie in `[-π/2, π/2]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Longitude-like coordinate [radians]
    pub lon: f64,
    /// Latitude-like coordinate [radians]
    pub lat: f64,
}

impl Direction {
    /// Make a new `Direction` struct from values in radians.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Make a new `Direction` struct from values in degrees.
    pub fn new_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }

    /// Calculate the angular distance between two directions \[radians\].
    ///
    /// This uses the Vincenty formula, which is well conditioned for both
    /// small and antipodal separations.
    pub fn separation(&self, b: &Self) -> f64 {
        let (s_lat1, c_lat1) = self.lat.sin_cos();
        let (s_lat2, c_lat2) = b.lat.sin_cos();
        let (s_dlon, c_dlon) = (b.lon - self.lon).sin_cos();
        let num1 = c_lat2 * s_dlon;
        let num2 = c_lat1 * s_lat2 - s_lat1 * c_lat2 * c_dlon;
        let den = s_lat1 * s_lat2 + c_lat1 * c_lat2 * c_dlon;
        num1.hypot(num2).atan2(den)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}°, {}°)", self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// A point on the plane tangent to the sphere at some reference direction.
///
/// `x` points in the direction of increasing longitude and `y` points along
/// the reference meridian towards the north pole. Both are "radians", i.e.
/// dimensionless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the origin of the plane.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Which spherical coordinate system a pair of angles is expressed in. This
/// only selects which reference direction is used; the projections themselves
/// don't care.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CoordSystem {
    /// Horizontal coordinates.
    #[default]
    #[strum(serialize = "azel")]
    #[serde(rename = "azel")]
    AzEl,

    /// Equatorial coordinates.
    #[strum(serialize = "radec")]
    #[serde(rename = "radec")]
    RaDec,
}

/// The position of a reference target (e.g. the target being tracked) in both
/// of the supported coordinate systems, as supplied by the ephemeris layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReferenceDirections {
    pub azel: Direction,
    pub radec: Direction,
}

impl ReferenceDirections {
    pub fn new(azel: Direction, radec: Direction) -> Self {
        Self { azel, radec }
    }

    /// Get the reference direction in the requested coordinate system.
    pub fn get(&self, coord_system: CoordSystem) -> Direction {
        match coord_system {
            CoordSystem::AzEl => self.azel,
            CoordSystem::RaDec => self.radec,
        }
    }
}
