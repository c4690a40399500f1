// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Super module for all coordinate types.
//!
//! The correction engine is agnostic to which spherical coordinate system is
//! in use; a [`Direction`] may hold (azimuth, elevation), (right ascension,
//! declination) or anything else with a longitude-like and a latitude-like
//! angle.

pub mod azel;
pub mod direction;

// Re-exports.
pub use azel::AzEl;
pub use direction::{CoordSystem, Direction, PlanePoint, ReferenceDirections};
