// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fitting pointing model parameters to observed pointing offsets.
//!
//! The model is linear in its parameters, so it is fit with linear least
//! squares: a design matrix of weighted basis functions is decomposed with an
//! SVD and solved as in Press et al., "Numerical Recipes in C", 2nd Ed.,
//! Section 15.4 ("General Linear Least Squares"), Eqs. 15.4.17 and 15.4.19.

use itertools::izip;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::ArrayView1;

use super::{PointingModel, PointingModelError, PARAMETERS};
use crate::{
    constants::{FIT_SINGULAR_VALUE_CUTOFF, FIT_SVD_MAX_ITERATIONS, NUM_POINTING_PARAMS},
    math::check_same_shape,
};

/// P2 is meaningless for an alt-az mount.
const P2: usize = 1;
/// P10 is redundant with P8 for an alt-az mount.
const P10: usize = 9;

/// Which pointing model parameters are fit. The rest are zeroed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnabledParams {
    /// P-numbers of the enabled parameters, starting at **1**.
    Indices(Vec<usize>),

    /// One flag per parameter; index 0 is P1.
    Mask(Vec<bool>),
}

impl Default for EnabledParams {
    /// The 6 main parameters modelling coordinate misalignment: P1, P3, P4,
    /// P5, P6 and P7.
    fn default() -> Self {
        EnabledParams::Indices(vec![1, 3, 4, 5, 6, 7])
    }
}

impl EnabledParams {
    /// Every parameter that can be fit for an alt-az mount (i.e. all except P2
    /// and P10).
    pub fn all_usable() -> Self {
        EnabledParams::Indices(
            (1..=NUM_POINTING_PARAMS)
                .filter(|&p| p != P2 + 1 && p != P10 + 1)
                .collect(),
        )
    }

    /// Convert to a mask, removing P2 and P10 with a warning if they're
    /// enabled.
    pub(crate) fn to_mask(&self) -> Result<[bool; NUM_POINTING_PARAMS], PointingModelError> {
        let mut mask = [false; NUM_POINTING_PARAMS];
        match self {
            EnabledParams::Indices(indices) => {
                for &p in indices {
                    if p == 0 || p > NUM_POINTING_PARAMS {
                        return Err(PointingModelError::BadParamIndex(p));
                    }
                    mask[p - 1] = true;
                }
            }

            EnabledParams::Mask(flags) => {
                if flags.len() != NUM_POINTING_PARAMS {
                    return Err(PointingModelError::BadMaskLength(flags.len()));
                }
                mask.copy_from_slice(flags);
            }
        }

        if mask[P2] {
            warn!("Pointing model parameter P2 is meaningless for alt-az mount - disabled P2");
            mask[P2] = false;
        }
        if mask[P10] {
            warn!("Pointing model parameter P10 is redundant for alt-az mount (same as P8) - disabled P10");
            mask[P10] = false;
        }
        Ok(mask)
    }
}

/// The result of a pointing model fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedParams {
    /// Fitted parameters of the full model (radians, except P9 and P12).
    /// Disabled parameters are zero.
    pub params: [f64; NUM_POINTING_PARAMS],

    /// Standard errors on the fitted parameters. Disabled parameters have zero
    /// error.
    pub sigma_params: [f64; NUM_POINTING_PARAMS],

    /// The ratio of the largest to the smallest singular value of the design
    /// matrix. `None` if nothing was fit.
    pub condition_number: Option<f64>,
}

impl PointingModel {
    /// Fit the pointing model parameters to observed (az, el) offsets. A subset
    /// of the parameters can be fit, while the rest will be zeroed. This is
    /// generally a good idea, as most of the parameters (P9 and above) are ad
    /// hoc and should only be enabled if there is sufficient evidence for them
    /// in the pointing error residuals.
    ///
    /// `az` and `el` are the requested positions and `delta_az` and `delta_el`
    /// the corresponding observed offsets \[radians\]. Standard deviations of
    /// the offsets can be supplied with `sigma_daz` and `sigma_del` (the
    /// default is 1), and are reflected in the standard errors of the fitted
    /// parameters. All arrays must have the same length.
    ///
    /// The model's parameters are replaced by the fitted ones, which are also
    /// returned along with their standard errors. If the fit fails, the model
    /// is left alone.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self,
        az: ArrayView1<f64>,
        el: ArrayView1<f64>,
        delta_az: ArrayView1<f64>,
        delta_el: ArrayView1<f64>,
        sigma_daz: Option<ArrayView1<f64>>,
        sigma_del: Option<ArrayView1<f64>>,
        enabled: &EnabledParams,
    ) -> Result<FittedParams, PointingModelError> {
        check_same_shape(&az, "az", &el, "el")?;
        check_same_shape(&az, "az", &delta_az, "delta_az")?;
        check_same_shape(&az, "az", &delta_el, "delta_el")?;
        if let Some(sigma_daz) = sigma_daz.as_ref() {
            check_same_shape(&az, "az", sigma_daz, "sigma_daz")?;
        }
        if let Some(sigma_del) = sigma_del.as_ref() {
            check_same_shape(&az, "az", sigma_del, "sigma_del")?;
        }
        let mask = enabled.to_mask()?;
        check_finite(&az, "az")?;
        check_finite(&el, "el")?;
        check_finite(&delta_az, "delta_az")?;
        check_finite(&delta_el, "delta_el")?;
        if let Some(sigma_daz) = sigma_daz.as_ref() {
            check_sigma(sigma_daz, "sigma_daz")?;
        }
        if let Some(sigma_del) = sigma_del.as_ref() {
            check_sigma(sigma_del, "sigma_del")?;
        }

        let mut fitted = FittedParams {
            params: [0.0; NUM_POINTING_PARAMS],
            sigma_params: [0.0; NUM_POINTING_PARAMS],
            condition_number: None,
        };
        let enabled: Vec<usize> = (0..NUM_POINTING_PARAMS).filter(|&i| mask[i]).collect();
        if enabled.is_empty() {
            self.params = fitted.params;
            return Ok(fitted);
        }
        let num_points = az.len();
        if num_points == 0 {
            return Err(PointingModelError::NoData);
        }

        // The az and el offsets count as separate measurements.
        let num_rows = 2 * num_points;
        let num_cols = enabled.len();
        let weight = |sigma: &Option<ArrayView1<f64>>, i: usize| -> f64 {
            sigma.as_ref().map(|s| 1.0 / s[i]).unwrap_or(1.0)
        };

        // Each column of the design matrix holds a weighted basis function,
        // obtained by evaluating a model with a single unit parameter.
        let mut design = DMatrix::<f64>::zeros(num_rows, num_cols);
        for (col, &param) in enabled.iter().enumerate() {
            let mut basis = PointingModel::new();
            basis.params[param] = 1.0;
            for (i, (&az, &el)) in az.iter().zip(el.iter()).enumerate() {
                let (basis_az, basis_el) = basis.offset(az, el);
                design[(i, col)] = basis_az * el.cos() * weight(&sigma_daz, i);
                design[(num_points + i, col)] = basis_el * weight(&sigma_del, i);
            }
        }
        let mut measurements = DVector::<f64>::zeros(num_rows);
        for (i, (&el, &delta_az, &delta_el)) in
            izip!(el.iter(), delta_az.iter(), delta_el.iter()).enumerate()
        {
            measurements[i] = delta_az * el.cos() * weight(&sigma_daz, i);
            measurements[num_points + i] = delta_el * weight(&sigma_del, i);
        }

        let svd = design
            .try_svd(true, true, f64::EPSILON, FIT_SVD_MAX_ITERATIONS)
            .ok_or(PointingModelError::SvdFailed)?;
        let u = svd.u.ok_or(PointingModelError::SvdFailed)?;
        let v_t = svd.v_t.ok_or(PointingModelError::SvdFailed)?;
        let s = svd.singular_values;
        let s_max = s.max();
        let s_min = s.min();
        let condition_number = s_max / s_min;
        debug!(
            "Fit pointing model using {num_rows}x{num_cols} design matrix with condition number {condition_number:.2}"
        );

        // Singular values that are zero to machine precision are dropped rather
        // than inverted.
        let cutoff = FIT_SINGULAR_VALUE_CUTOFF * s_max;
        let inverse_s: Vec<f64> = s
            .iter()
            .map(|&s_j| if s_j > cutoff { 1.0 / s_j } else { 0.0 })
            .collect();
        let num_dropped = inverse_s.iter().filter(|&&w| w == 0.0).count();
        if num_dropped > 0 {
            warn!(
                "Pointing model design matrix is singular; ignored {num_dropped} of {} singular values (condition number {condition_number:e})",
                inverse_s.len()
            );
        }

        // p = V diag(1/s) U^T b
        let u_t_b = u.tr_mul(&measurements);
        for (col, &param) in enabled.iter().enumerate() {
            let mut value = 0.0;
            let mut variance = 0.0;
            for (j, &w) in inverse_s.iter().enumerate() {
                let v = v_t[(j, col)];
                value += v * w * u_t_b[j];
                variance += (v * w).powi(2);
            }
            fitted.params[param] = value;
            fitted.sigma_params[param] = variance.sqrt();
        }
        fitted.condition_number = Some(condition_number);

        for (&value, info) in fitted.params.iter().zip(PARAMETERS.iter()) {
            if value != 0.0 {
                debug!("Fitted {} = {value:e}", info.name);
            }
        }
        self.params = fitted.params;
        Ok(fitted)
    }
}

/// Find the first non-finite value of a fit input.
fn check_finite(values: &ArrayView1<f64>, name: &'static str) -> Result<(), PointingModelError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PointingModelError::NonFiniteFitData { name, index }),
        None => Ok(()),
    }
}

/// Standard deviations are used as weights of 1/sigma, so they must be
/// positive and finite.
fn check_sigma(sigma: &ArrayView1<f64>, name: &'static str) -> Result<(), PointingModelError> {
    match sigma.iter().position(|&s| !(s.is_finite() && s > 0.0)) {
        Some(index) => Err(PointingModelError::BadSigma {
            name,
            index,
            value: sigma[index],
        }),
        None => Ok(()),
    }
}
