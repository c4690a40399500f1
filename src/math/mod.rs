// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics, and the plumbing that lets every correction accept
//! either a single angle or an array of angles.

mod error;

pub use error::ShapeError;

use ndarray::{ArrayView, Dimension};

use crate::constants::{ARCSEC, FRAC_PI_2, TAU};

/// Wrap an angle into the interval `[-period / 2, period / 2)`.
///
/// # Examples
///
/// `assert_abs_diff_eq!(wrap_angle(3.0 * PI / 2.0, TAU), -PI / 2.0);`
#[inline]
pub fn wrap_angle(angle: f64, period: f64) -> f64 {
    (angle + 0.5 * period).rem_euclid(period) - 0.5 * period
}

/// The difference between two angles, wrapped into `[-π, π)` \[radians\].
#[inline]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_angle(a - b, TAU)
}

/// Is this latitude-like angle within `[-π/2, π/2]`?
#[inline]
pub(crate) fn is_valid_latitude(lat: f64) -> bool {
    lat.abs() <= FRAC_PI_2
}

/// The sign of `x`, with `sign(0) == 0`. Rust's `f64::signum` says `+0` is
/// positive, which is not what the zenith regularisation wants.
#[inline]
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Broadcast `view` up to the shape `dim`. A 0-d array (a scalar) broadcasts to
/// any shape.
pub(crate) fn broadcast<'a, E, D>(
    view: &'a ArrayView<f64, E>,
    dim: &D,
    name: &'static str,
) -> Result<ArrayView<'a, f64, D>, ShapeError>
where
    E: Dimension,
    D: Dimension,
{
    view.broadcast(dim.clone())
        .ok_or_else(|| ShapeError::Broadcast {
            name,
            shape: view.shape().to_vec(),
            target: dim.slice().to_vec(),
        })
}

/// Make sure that two arrays that pair up element by element have the same
/// shape.
pub(crate) fn check_same_shape<D: Dimension>(
    a: &ArrayView<f64, D>,
    a_name: &'static str,
    b: &ArrayView<f64, D>,
    b_name: &'static str,
) -> Result<(), ShapeError> {
    if a.shape() == b.shape() {
        Ok(())
    } else {
        Err(ShapeError::Mismatch {
            a_name,
            a_shape: a.shape().to_vec(),
            b_name,
            b_shape: b.shape().to_vec(),
        })
    }
}

/// An iterative inverse (reverse pointing or refraction correction) ran out
/// of iterations before reaching its tolerance. The best estimate is still
/// returned alongside this warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceWarning {
    /// Which correction was being reversed.
    pub solver: &'static str,

    /// The number of iterations that were performed.
    pub iterations: usize,

    /// The largest remaining error over all inputs \[radians\].
    pub max_error: f64,

    /// For array inputs, the flat (row-major) index of the input with the
    /// largest error.
    pub worst_index: Option<usize>,
}

impl ConvergenceWarning {
    /// The largest remaining error \[arcseconds\].
    pub fn max_error_arcsec(&self) -> f64 {
        self.max_error / ARCSEC
    }
}

impl std::fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} did not converge in {} iterations - maximum error is {:.6} arcsecs",
            self.solver,
            self.iterations,
            self.max_error_arcsec()
        )?;
        if let Some(i) = self.worst_index {
            write!(f, " (input {i})")?;
        }
        Ok(())
    }
}

/// The result of an iterative inverse: the best estimate found, and a warning
/// if the solver hit its iteration cap.
#[derive(Debug, Clone)]
pub struct Solution<T> {
    pub value: T,
    pub warning: Option<ConvergenceWarning>,
}

impl<T> Solution<T> {
    /// Did every input reach the solver's tolerance?
    pub fn converged(&self) -> bool {
        self.warning.is_none()
    }

    /// Discard any convergence warning and keep the estimate.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// How a single element of an iterative inverse finished.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ElementStatus {
    pub(crate) iterations: usize,
    pub(crate) error: f64,
    pub(crate) converged: bool,
}

/// Summarise the per-element statuses of an iterative inverse into a single
/// optional warning, reporting the worst unconverged element.
pub(crate) fn summarise_convergence<'a, I>(
    solver: &'static str,
    statuses: I,
) -> Option<ConvergenceWarning>
where
    I: IntoIterator<Item = &'a ElementStatus>,
{
    let mut warning: Option<ConvergenceWarning> = None;
    for (i, status) in statuses.into_iter().enumerate() {
        if status.converged {
            continue;
        }
        match warning.as_mut() {
            Some(w) => {
                w.iterations = w.iterations.max(status.iterations);
                if status.error > w.max_error {
                    w.max_error = status.error;
                    w.worst_index = Some(i);
                }
            }
            None => {
                warning = Some(ConvergenceWarning {
                    solver,
                    iterations: status.iterations,
                    max_error: status.error,
                    worst_index: Some(i),
                })
            }
        }
    }
    warning
}
