// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Corrections are small angles added
to large ones, so nothing here should ever be demoted to single precision.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// One arcminute \[radians\]
pub const ARCMIN: f64 = PI / (180.0 * 60.0);
/// One arcsecond \[radians\]
pub const ARCSEC: f64 = PI / (180.0 * 3600.0);

/// The number of parameters in the full pointing model.
pub const NUM_POINTING_PARAMS: usize = 22;

/// The smallest |cos(el)| used in the secant and tangent terms of the pointing
/// model (6 arcminutes from zenith) \[radians\]. This caps azimuth offsets
/// close to the pole of an alt-az mount.
pub const POINTING_MIN_COS_EL: f64 = 6.0 * ARCMIN;

/// Sky-error tolerance of the reverse pointing correction \[radians\].
pub const POINTING_REVERSE_TOLERANCE: f64 = 0.01 * ARCSEC;
/// The maximum number of Newton iterations used to reverse the pointing
/// correction.
pub const POINTING_REVERSE_MAX_ITERATIONS: usize = 30;

/// Elevation tolerance of the reverse refraction correction \[radians\].
pub const REFRACTION_REVERSE_TOLERANCE: f64 = 0.01 * ARCSEC;
/// The maximum number of bisection iterations used to reverse the refraction
/// correction.
pub const REFRACTION_REVERSE_MAX_ITERATIONS: usize = 40;

/// Refraction is evaluated at no less than this elevation \[degrees\].
pub const REFRACTION_MIN_ELEVATION_DEG: f64 = 1.0;

/// The orthographic projection accepts targets with cos(theta) down to minus
/// this value, so that points exactly 90 degrees from the reference point
/// survive rounding.
pub const SIN_COS_THETA_SLACK: f64 = f64::EPSILON;

/// The gnomonic projection rejects targets with cos(theta) below this value.
/// Points 90 degrees from the reference point map to infinity.
pub const TAN_MIN_COS_THETA: f64 = f64::EPSILON;

/// The stereographic projection rejects targets with 1 + cos(theta) below this
/// value (i.e. too close to the antipode of the reference point).
pub const STG_MIN_DENOMINATOR: f64 = 1e-5;

/// Singular values of the pointing-model design matrix smaller than this
/// fraction of the largest singular value are treated as zero.
pub const FIT_SINGULAR_VALUE_CUTOFF: f64 = 1e-12;
/// The maximum number of iterations of the SVD used by the pointing model
/// fit.
pub const FIT_SVD_MAX_ITERATIONS: usize = 1000;
