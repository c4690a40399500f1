// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Correction of elevation angles for refractive bending in the atmosphere.

The correction is calculated from surface weather measurements. It can also be
undone, usually to refer the actual antenna position to the coordinate frame
before corrections were applied.
 */

mod error;

pub use error::RefractionError;

use itertools::Itertools;
use log::warn;
use ndarray::{Array, ArrayView, Dimension, Zip};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    constants::{
        ARCSEC, REFRACTION_MIN_ELEVATION_DEG, REFRACTION_REVERSE_MAX_ITERATIONS,
        REFRACTION_REVERSE_TOLERANCE,
    },
    math::{broadcast, summarise_convergence, ConvergenceWarning, ElementStatus, Solution},
};

const REVERSE_SOLVER: &str = "Reverse refraction correction";

lazy_static::lazy_static! {
    pub(crate) static ref REFRACTION_MODELS_COMMA_SEPARATED: String =
        RefractionModel::iter().map(|m| format!("'{m}'")).join(", ");
}

/// Surface weather measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Ambient air temperature at the surface \[degrees Celsius\]
    pub temperature_c: f64,

    /// Total barometric pressure at the surface \[hPa, i.e. millibars\]
    pub pressure_hpa: f64,

    /// Relative humidity at the surface, as a percentage in `[0, 100]`
    pub humidity_percent: f64,
}

impl Weather {
    pub fn new(temperature_c: f64, pressure_hpa: f64, humidity_percent: f64) -> Weather {
        Weather {
            temperature_c,
            pressure_hpa,
            humidity_percent,
        }
    }
}

/// Calculate the refraction correction using the model in the VLBI Field
/// System \[radians\]. The result needs to be *added* to the elevation angle
/// `el` \[radians\] to correct it.
///
/// The code is based on poclb/refrwn.c in Field System version 9.9.2, which is
/// a C version (with typos fixed) of the Fortran version in polb/refr.f. The
/// model originated with the Haystack pointing system and agrees well with the
/// DSN refraction model. See Himwich, "Station Programs", Mark IV Field System
/// Reference Manual, Version 8.2, 1 September 1993.
pub fn refraction_offset_vlbi(
    el: f64,
    temperature_c: f64,
    pressure_hpa: f64,
    humidity_percent: f64,
) -> f64 {
    const P: [f64; 5] = [0.458675e1, 0.322009e0, 0.103452e-1, 0.274777e-3, 0.157115e-5];
    const CVT: f64 = 1.33289;
    const A: f64 = 40.0;
    const B: f64 = 2.7;
    const C: f64 = 4.0;
    const D: f64 = 42.5;
    const E: f64 = 0.4;
    const F: f64 = 2.64;
    const G: f64 = 0.57295787e-4;

    // Surface refractivity, via the dew point and the partial pressure of
    // water vapour.
    let rhumi = (100.0 - humidity_percent) * 0.9;
    let dewpt = temperature_c - rhumi * (0.136667 + rhumi * 1.33333e-3 + temperature_c * 1.5e-3);
    let pp = P[0] + dewpt * (P[1] + dewpt * (P[2] + dewpt * (P[3] + dewpt * P[4])));
    let temperature_k = temperature_c + 273.0;
    let sn = 77.6 * (pressure_hpa + (4810.0 * CVT * pp) / temperature_k) / temperature_k;

    // Clip at 1 degree to avoid the cot(el) blow-up at the horizon.
    let el_deg = el.to_degrees().clamp(REFRACTION_MIN_ELEVATION_DEG, 90.0);
    let aphi = A / (el_deg + B).powf(C);
    let dele = -D / (el_deg + E).powf(F);
    let zenith_angle = (90.0 - el_deg).to_radians();
    let bphi = G * (zenith_angle.tan() + dele);

    (bphi * sn - aphi).to_radians()
}

/// The available refraction models.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum RefractionModel {
    #[default]
    #[strum(serialize = "VLBI Field System")]
    #[serde(rename = "VLBI Field System")]
    VlbiFieldSystem,
}

/// Correct pointing for refractive bending in the atmosphere, using one of the
/// [`RefractionModel`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefractionCorrection {
    model: RefractionModel,
}

impl RefractionCorrection {
    /// Use the refraction model with the given name.
    pub fn new(model: &str) -> Result<RefractionCorrection, RefractionError> {
        let model = model
            .parse()
            .map_err(|_| RefractionError::UnknownModel {
                input: model.to_string(),
                valid: REFRACTION_MODELS_COMMA_SEPARATED.as_str(),
            })?;
        Ok(RefractionCorrection { model })
    }

    pub fn model(&self) -> RefractionModel {
        self.model
    }

    /// The refraction offset at elevation `el` \[radians\], which needs to be
    /// *added* to the elevation to correct it.
    pub fn offset(&self, el: f64, weather: &Weather) -> f64 {
        match self.model {
            RefractionModel::VlbiFieldSystem => refraction_offset_vlbi(
                el,
                weather.temperature_c,
                weather.pressure_hpa,
                weather.humidity_percent,
            ),
        }
    }

    /// Apply the refraction correction to elevation `el` \[radians\].
    pub fn apply(&self, el: f64, weather: &Weather) -> f64 {
        el + self.offset(el, weather)
    }

    /// Undo the refraction correction for a single elevation with a binary
    /// search. This assumes that the refracted elevation is a monotonic
    /// function of the unrefracted one.
    fn reverse_element(&self, refracted_el: f64, weather: &Weather) -> (f64, ElementStatus) {
        // The offset from the refracted elevation is similar to the offset from
        // the unrefracted one, which gives a lower bound on the answer.
        let close_offset = self.offset(refracted_el, weather);
        let mut lower = refracted_el - 4.0 * close_offset.abs();
        // Refraction (nearly) always lifts the elevation, so the refracted
        // elevation is an upper bound.
        let mut upper = refracted_el + ARCSEC;

        let mut el = 0.5 * (lower + upper);
        let mut status = ElementStatus::default();
        for iteration in 0..REFRACTION_REVERSE_MAX_ITERATIONS {
            el = 0.5 * (lower + upper);
            let test_el = self.apply(el, weather);
            status.iterations = iteration + 1;
            status.error = (test_el - refracted_el).abs();
            if status.error < REFRACTION_REVERSE_TOLERANCE {
                status.converged = true;
                break;
            }
            if test_el < refracted_el {
                lower = el;
            } else {
                upper = el;
            }
        }
        (el, status)
    }

    /// Remove the refraction correction from elevation `refracted_el`
    /// \[radians\]; this is the inverse of [`RefractionCorrection::apply`].
    ///
    /// The search stops when the elevation is within 0.01 arcseconds. If this
    /// doesn't happen within 40 iterations, a warning is logged and attached to
    /// the returned best estimate.
    pub fn reverse(&self, refracted_el: f64, weather: &Weather) -> Solution<f64> {
        let (value, status) = self.reverse_element(refracted_el, weather);
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
            warn!("{w}");
        }
        Solution { value, warning }
    }

    /// Get refraction offsets for an array of elevations. The weather arrays
    /// are broadcast against the elevations; use 0-d arrays for a single
    /// weather measurement.
    pub fn offset_array<D, E>(
        &self,
        el: ArrayView<f64, D>,
        temperature_c: ArrayView<f64, E>,
        pressure_hpa: ArrayView<f64, E>,
        humidity_percent: ArrayView<f64, E>,
    ) -> Result<Array<f64, D>, RefractionError>
    where
        D: Dimension,
        E: Dimension,
    {
        let dim = el.raw_dim();
        let temperature_c = broadcast(&temperature_c, &dim, "temperature_c")?;
        let pressure_hpa = broadcast(&pressure_hpa, &dim, "pressure_hpa")?;
        let humidity_percent = broadcast(&humidity_percent, &dim, "humidity_percent")?;
        Ok(Zip::from(&el)
            .and(&temperature_c)
            .and(&pressure_hpa)
            .and(&humidity_percent)
            .map_collect(|&el, &t, &p, &h| self.offset(el, &Weather::new(t, p, h))))
    }

    /// Apply the refraction correction to an array of elevations. The weather
    /// arrays are broadcast against the elevations.
    pub fn apply_array<D, E>(
        &self,
        el: ArrayView<f64, D>,
        temperature_c: ArrayView<f64, E>,
        pressure_hpa: ArrayView<f64, E>,
        humidity_percent: ArrayView<f64, E>,
    ) -> Result<Array<f64, D>, RefractionError>
    where
        D: Dimension,
        E: Dimension,
    {
        let mut refracted =
            self.offset_array(el.view(), temperature_c, pressure_hpa, humidity_percent)?;
        refracted += &el;
        Ok(refracted)
    }

    /// Remove the refraction correction from an array of elevations. The
    /// weather arrays are broadcast against the elevations. Each elevation is
    /// solved independently (and in parallel), so the results match
    /// [`RefractionCorrection::reverse`] element for element.
    pub fn reverse_array<D, E>(
        &self,
        refracted_el: ArrayView<f64, D>,
        temperature_c: ArrayView<f64, E>,
        pressure_hpa: ArrayView<f64, E>,
        humidity_percent: ArrayView<f64, E>,
    ) -> Result<Solution<Array<f64, D>>, RefractionError>
    where
        D: Dimension,
        E: Dimension,
    {
        let dim = refracted_el.raw_dim();
        let temperature_c = broadcast(&temperature_c, &dim, "temperature_c")?;
        let pressure_hpa = broadcast(&pressure_hpa, &dim, "pressure_hpa")?;
        let humidity_percent = broadcast(&humidity_percent, &dim, "humidity_percent")?;

        let mut el = Array::<f64, D>::zeros(dim.clone());
        let mut statuses = Array::<ElementStatus, D>::default(dim);
        Zip::from(&mut el)
            .and(&mut statuses)
            .and(&refracted_el)
            .and(&temperature_c)
            .and(&pressure_hpa)
            .and(&humidity_percent)
            .par_for_each(|el, status, &refracted_el, &t, &p, &h| {
                (*el, *status) = self.reverse_element(refracted_el, &Weather::new(t, p, h));
            });

        let warning = summarise_convergence(REVERSE_SOLVER, statuses.iter());
        if let Some(w) = warning.as_ref() {
            warn!("{w}");
        }
        Ok(Solution {
            value: el,
            warning,
        })
    }
}

impl std::fmt::Display for RefractionCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Refraction correction using the '{}' model", self.model)
    }
}
