// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod correction_chain;
mod model_files;

use ndarray::Array1;

use antenna_pointing::PointingModel;

/// A pointing model with a handful of typical terms, all of a few arcminutes.
fn typical_pointing_model() -> PointingModel {
    PointingModel::from_description("-0.05 0 0.02 -0.01 0.03 0.004 0.06", false).unwrap()
}

/// Azimuths and elevations of a spiral over the visible sky [radians].
fn sky_spiral(num_points: usize) -> (Array1<f64>, Array1<f64>) {
    let az = Array1::from_shape_fn(num_points, |i| (i as f64 * 37.0 % 360.0 - 180.0).to_radians());
    let el = Array1::from_shape_fn(num_points, |i| {
        (10.0 + 75.0 * i as f64 / num_points as f64).to_radians()
    });
    (az, el)
}
