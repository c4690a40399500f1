// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Pointing correction for a non-ideal antenna mount.

The pointing model is the one found in the VLBI Field System (poclb/fln.c and
poclb/flt.c in Field System version 9.9.0) and has the standard terms found in
most pointing models, including the DSN and TPOINT models. These terms are
numbered P1 to P22. The first 8 have a standard physical interpretation related
to misalignment of the mount coordinate system and gravitational deformation,
while the rest are ad hoc parameters that model remaining systematic effects in
the pointing error residuals. The model is specialised for an alt-az mount (the
angle phi of the Field System model is fixed at 90 degrees), so P2 and P10 are
never used.

See Himwich, "Pointing Model Derivation", Mark IV Field System Reference
Manual, Version 8.2, 1 September 1993.
 */

mod error;
mod fit;
pub(crate) mod params;

pub use error::PointingModelError;
pub use fit::{EnabledParams, FittedParams};
pub use params::{param_index, procrustean_assign, DiscardedParams, ParamInfo, PARAMETERS};

use log::warn;
use ndarray::{Array, ArrayView, Dimension, Zip};

use crate::{
    constants::{
        NUM_POINTING_PARAMS, POINTING_MIN_COS_EL, POINTING_REVERSE_MAX_ITERATIONS,
        POINTING_REVERSE_TOLERANCE,
    },
    math::{
        check_same_shape, sign, summarise_convergence, ConvergenceWarning, ElementStatus, Solution,
    },
    model_file::Model,
};

const REVERSE_SOLVER: &str = "Reverse pointing correction";

/// The coefficients of the pointing model. All parameters are in radians,
/// except P9 and P12, which are unitless scale factors. A parameter is active
/// if it is non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointingModel {
    params: [f64; NUM_POINTING_PARAMS],
}

/// The trigonometric terms of (az, el) that the model is built from, each
/// computed only once.
struct Terms {
    az: f64,
    sin_az: f64,
    cos_az: f64,
    sin_2az: f64,
    cos_2az: f64,
    el: f64,
    sin_el: f64,
    cos_el: f64,
    sin_8el: f64,
    cos_8el: f64,
    sec_el: f64,
    tan_el: f64,
}

impl Terms {
    fn new(az: f64, el: f64) -> Terms {
        let (sin_az, cos_az) = az.sin_cos();
        let (sin_2az, cos_2az) = (2.0 * az).sin_cos();
        let (sin_el, cos_el) = el.sin_cos();
        let (sin_8el, cos_8el) = (8.0 * el).sin_cos();
        // The model breaks down at the pole of the mount (zenith), where
        // azimuth offsets become arbitrarily large. Keep cos(el) away from zero
        // to cap them; this only affects the azimuth offset. The sign of
        // cos(el) is kept so that a plunged antenna is still corrected
        // properly.
        let sec_el = sign(cos_el) / cos_el.abs().clamp(POINTING_MIN_COS_EL, 1.0);
        Terms {
            az,
            sin_az,
            cos_az,
            sin_2az,
            cos_2az,
            el,
            sin_el,
            cos_el,
            sin_8el,
            cos_8el,
            sec_el,
            tan_el: sin_el * sec_el,
        }
    }
}

/// The Jacobian matrix of the function `(az, el) -> apply(az, el)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Jacobian {
    pub(crate) daz_daz: f64,
    pub(crate) daz_del: f64,
    pub(crate) del_daz: f64,
    pub(crate) del_del: f64,
}

impl PointingModel {
    /// A pointing model with every parameter set to zero.
    pub fn new() -> PointingModel {
        PointingModel::default()
    }

    /// Make a pointing model from a slice of parameters (radians, except for P9
    /// and P12).
    ///
    /// If `strict`, exactly [`NUM_POINTING_PARAMS`] values must be supplied.
    /// Otherwise a Procrustean assignment is done: the first
    /// [`NUM_POINTING_PARAMS`] values are used and missing values are set to
    /// zero; a warning is logged if non-zero values are discarded.
    pub fn from_params(params: &[f64], strict: bool) -> Result<PointingModel, PointingModelError> {
        if strict && params.len() != NUM_POINTING_PARAMS {
            return Err(PointingModelError::WrongParamCount(params.len()));
        }
        let (params, discarded) = procrustean_assign(params);
        if let Some(discarded) = discarded {
            warn!("{discarded}");
        }
        Ok(PointingModel { params })
    }

    /// Make a pointing model from its description string (see
    /// [`PointingModel::description`]). The values are in degrees (except for
    /// P9 and P12), either decimal or "D:M:S". `strict` behaves as in
    /// [`PointingModel::from_params`].
    pub fn from_description(
        description: &str,
        strict: bool,
    ) -> Result<PointingModel, PointingModelError> {
        let params = params::parse_description(description)?;
        PointingModel::from_params(&params, strict)
    }

    /// All parameters of the model. Index 0 is P1.
    pub fn params(&self) -> &[f64; NUM_POINTING_PARAMS] {
        &self.params
    }

    /// Replace all parameters of the model.
    pub fn set_params(&mut self, params: [f64; NUM_POINTING_PARAMS]) {
        self.params = params;
    }

    /// Get a single parameter by its P-number (starting at 1).
    pub fn param(&self, p: usize) -> Result<f64, PointingModelError> {
        p.checked_sub(1)
            .and_then(|i| self.params.get(i))
            .copied()
            .ok_or(PointingModelError::BadParamIndex(p))
    }

    /// Set a single parameter by its P-number (starting at 1).
    pub fn set_param(&mut self, p: usize, value: f64) -> Result<(), PointingModelError> {
        let slot = p
            .checked_sub(1)
            .and_then(|i| self.params.get_mut(i))
            .ok_or(PointingModelError::BadParamIndex(p))?;
        *slot = value;
        Ok(())
    }

    /// Get a single parameter by its name, e.g. "P7".
    pub fn param_by_name(&self, name: &str) -> Result<f64, PointingModelError> {
        param_index(name)
            .map(|i| self.params[i])
            .ok_or_else(|| PointingModelError::UnknownParam(name.to_string()))
    }

    /// Set a single parameter by its name, e.g. "P7".
    pub fn set_param_by_name(&mut self, name: &str, value: f64) -> Result<(), PointingModelError> {
        let i = param_index(name)
            .ok_or_else(|| PointingModelError::UnknownParam(name.to_string()))?;
        self.params[i] = value;
        Ok(())
    }

    /// The number of active (non-zero) parameters.
    pub fn active_params(&self) -> usize {
        self.params.iter().filter(|&&p| p != 0.0).count()
    }

    /// The text form of a single parameter by its P-number (starting at 1).
    pub fn param_str(&self, p: usize) -> Result<String, PointingModelError> {
        let value = self.param(p)?;
        Ok(params::format_value(value, &PARAMETERS[p - 1]))
    }

    /// A compact string representation of the model, sufficient to
    /// reconstruct it: all parameters joined with ", ", in degrees (except
    /// for P9 and P12) with 12 significant digits, and inactive parameters
    /// written as "0".
    pub fn description(&self) -> String {
        params::describe(&self.params)
    }

    fn offset_terms(&self, t: &Terms) -> (f64, f64) {
        let [p1, _p2, p3, p4, p5, p6, p7, p8, p9, _p10, p11, high @ ..] = self.params;
        let [p12, p13, p14, p15, p16, p17, p18, p19, p20, p21, p22] = high;
        let delta_az = p1 + p3 * t.tan_el - p4 * t.sec_el + p5 * t.sin_az * t.tan_el
            - p6 * t.cos_az * t.tan_el
            + p12 * t.az
            + p13 * t.cos_az
            + p14 * t.sin_az
            + p17 * t.cos_2az
            + p18 * t.sin_2az;
        let delta_el = p5 * t.cos_az
            + p6 * t.sin_az
            + p7
            + p8 * t.cos_el
            + p9 * t.el
            + p11 * t.sin_el
            + p15 * t.cos_2az
            + p16 * t.sin_2az
            + p19 * t.cos_8el
            + p20 * t.sin_8el
            + p21 * t.cos_az
            + p22 * t.sin_az;
        (delta_az, delta_el)
    }

    /// Get the pointing offset at a requested (az, el) position \[radians\].
    /// The offsets have to be *added* to the requested position to correct it.
    ///
    /// Within 6 arcminutes of zenith the azimuth offset is capped, as the
    /// model is singular there.
    pub fn offset(&self, az: f64, el: f64) -> (f64, f64) {
        self.offset_terms(&Terms::new(az, el))
    }

    /// Apply the pointing correction to a requested (az, el) position
    /// \[radians\], giving the position the antenna should be pointed at.
    pub fn apply(&self, az: f64, el: f64) -> (f64, f64) {
        let (delta_az, delta_el) = self.offset(az, el);
        (az + delta_az, el + delta_el)
    }

    pub(crate) fn jacobian(&self, az: f64, el: f64) -> Jacobian {
        let t = Terms::new(az, el);
        let [_p1, _p2, p3, p4, p5, p6, _p7, p8, p9, _p10, p11, high @ ..] = self.params;
        let [p12, p13, p14, p15, p16, p17, p18, p19, p20, p21, p22] = high;
        Jacobian {
            daz_daz: 1.0 + p5 * t.cos_az * t.tan_el + p6 * t.sin_az * t.tan_el + p12
                - p13 * t.sin_az
                + p14 * t.cos_az
                - 2.0 * p17 * t.sin_2az
                + 2.0 * p18 * t.cos_2az,
            daz_del: t.sec_el
                * (p3 * t.sec_el - p4 * t.tan_el + p5 * t.sin_az * t.sec_el
                    - p6 * t.cos_az * t.sec_el),
            del_daz: -p5 * t.sin_az + p6 * t.cos_az - 2.0 * p15 * t.sin_2az
                + 2.0 * p16 * t.cos_2az
                - p21 * t.sin_az
                + p22 * t.cos_az,
            del_del: 1.0 - p8 * t.sin_el + p9 + p11 * t.cos_el - 8.0 * p19 * t.sin_8el
                + 8.0 * p20 * t.cos_8el,
        }
    }

    /// Solve `apply(az, el) = (pointed_az, pointed_el)` for a single position
    /// with Newton's method.
    fn reverse_element(&self, pointed_az: f64, pointed_el: f64) -> ((f64, f64), ElementStatus) {
        // The fixed offsets are a good initial guess.
        let mut az = pointed_az - self.params[0];
        let mut el = pointed_el - self.params[6];
        let mut status = ElementStatus::default();
        for iteration in 0..POINTING_REVERSE_MAX_ITERATIONS {
            let j = self.jacobian(az, el);
            let (test_az, test_el) = self.apply(az, el);
            let b1 = pointed_az - test_az;
            let b2 = pointed_el - test_el;
            status.iterations = iteration + 1;
            status.error = (el.cos() * b1).hypot(b2);
            if status.error < POINTING_REVERSE_TOLERANCE {
                status.converged = true;
                break;
            }
            // The Jacobian is close to the identity as long as the parameters
            // are small, so Cramer's rule is good enough for each 2x2 step.
            let det = j.daz_daz * j.del_del - j.del_daz * j.daz_del;
            az += (j.del_del * b1 - j.daz_del * b2) / det;
            el += (j.daz_daz * b2 - j.del_daz * b1) / det;
        }
        ((az, el), status)
    }

    /// Remove the pointing correction from a pointed (az, el) position
    /// \[radians\]; this is the inverse of [`PointingModel::apply`].
    ///
    /// The correction is reversed with Newton's method, which stops when the
    /// sky error of the result is below 0.01 arcseconds. If this doesn't happen
    /// within 30 iterations, a warning is logged and attached to the returned
    /// best estimate.
    pub fn reverse(&self, pointed_az: f64, pointed_el: f64) -> Solution<(f64, f64)> {
        let (value, status) = self.reverse_element(pointed_az, pointed_el);
        let warning = if status.converged {
            None
        } else {
            Some(ConvergenceWarning {
                solver: REVERSE_SOLVER,
                iterations: status.iterations,
                max_error: status.error,
                worst_index: None,
            })
        };
        if let Some(w) = warning.as_ref() {
            warn!("{w} at (az, el) = ({pointed_az}, {pointed_el}) radians");
        }
        Solution { value, warning }
    }

    /// Get the pointing offsets for arrays of (az, el) positions, which must
    /// have the same shape.
    pub fn offset_array<D: Dimension>(
        &self,
        az: ArrayView<f64, D>,
        el: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), PointingModelError> {
        check_same_shape(&az, "az", &el, "el")?;
        let mut delta_az = Array::<f64, D>::zeros(az.raw_dim());
        let mut delta_el = Array::<f64, D>::zeros(az.raw_dim());
        Zip::from(&mut delta_az)
            .and(&mut delta_el)
            .and(&az)
            .and(&el)
            .for_each(|delta_az, delta_el, &az, &el| {
                (*delta_az, *delta_el) = self.offset(az, el);
            });
        Ok((delta_az, delta_el))
    }

    /// Apply the pointing correction to arrays of (az, el) positions, which
    /// must have the same shape.
    pub fn apply_array<D: Dimension>(
        &self,
        az: ArrayView<f64, D>,
        el: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), PointingModelError> {
        let (mut pointed_az, mut pointed_el) = self.offset_array(az.view(), el.view())?;
        pointed_az += &az;
        pointed_el += &el;
        Ok((pointed_az, pointed_el))
    }

    /// Reverse the pointing correction for arrays of pointed (az, el)
    /// positions, which must have the same shape. Each position is solved
    /// independently (and in parallel), so the results match
    /// [`PointingModel::reverse`] element for element. If any position doesn't
    /// converge, a single warning describing the worst one is logged and
    /// returned.
    pub fn reverse_array<D: Dimension>(
        &self,
        pointed_az: ArrayView<f64, D>,
        pointed_el: ArrayView<f64, D>,
    ) -> Result<Solution<(Array<f64, D>, Array<f64, D>)>, PointingModelError> {
        check_same_shape(&pointed_az, "pointed_az", &pointed_el, "pointed_el")?;
        let dim = pointed_az.raw_dim();
        let mut az = Array::<f64, D>::zeros(dim.clone());
        let mut el = Array::<f64, D>::zeros(dim.clone());
        let mut statuses = Array::<ElementStatus, D>::default(dim);
        Zip::from(&mut az)
            .and(&mut el)
            .and(&mut statuses)
            .and(&pointed_az)
            .and(&pointed_el)
            .par_for_each(|az, el, status, &pointed_az, &pointed_el| {
                let ((a, e), s) = self.reverse_element(pointed_az, pointed_el);
                *az = a;
                *el = e;
                *status = s;
            });

        let warning = summarise_convergence(REVERSE_SOLVER, statuses.iter());
        if let Some(w) = warning.as_ref() {
            warn!("{w}");
        }
        Ok(Solution {
            value: (az, el),
            warning,
        })
    }
}

impl Model for PointingModel {
    fn name(&self) -> &'static str {
        "PointingModel"
    }

    fn param_info(&self) -> &'static [ParamInfo] {
        PARAMETERS
    }

    fn param_values(&self) -> Vec<f64> {
        self.params.to_vec()
    }

    fn set_param_values(&mut self, values: &[f64]) {
        (self.params, _) = procrustean_assign(values);
    }
}

/// Models are equal if their descriptions are, i.e. to 12 significant digits.
impl PartialEq for PointingModel {
    fn eq(&self, other: &Self) -> bool {
        self.description() == other.description()
    }
}

impl std::fmt::Display for PointingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let num_active = self.active_params();
        write!(
            f,
            "Pointing model has {NUM_POINTING_PARAMS} parameters with {num_active} active (non-zero)"
        )?;
        if num_active == 0 {
            return Ok(());
        }
        write!(f, ":")?;
        for (&value, info) in self.params.iter().zip(PARAMETERS.iter()) {
            if value == 0.0 {
                continue;
            }
            write!(
                f,
                "\n{:<3} = {:>16} {:<3} ({})",
                info.name,
                params::format_value(value, info),
                info.units,
                info.doc
            )?;
        }
        Ok(())
    }
}
