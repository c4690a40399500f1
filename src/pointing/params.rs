// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pointing model's parameter table, and the conversion of parameters to
//! and from their compact, user-facing text form.
//!
//! The text form is in degrees, as this is what ends up in configuration files.
//! The exceptions are P9 and P12, which are scale factors and are written as
//! they are.

use itertools::{izip, Itertools};
use static_assertions::const_assert_eq;

use super::PointingModelError;
use crate::constants::NUM_POINTING_PARAMS;

/// Information on a single pointing model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    /// "P1" to "P22".
    pub name: &'static str,

    /// "deg" for angles, empty for scale factors.
    pub units: &'static str,

    /// What the parameter models. The bracketed term is the TPOINT name.
    pub doc: &'static str,
}

impl ParamInfo {
    /// Is this parameter an angle? Angles are stored in radians but written
    /// in degrees.
    pub fn is_angle(&self) -> bool {
        !self.units.is_empty()
    }
}

const fn angle(name: &'static str, doc: &'static str) -> ParamInfo {
    ParamInfo {
        name,
        units: "deg",
        doc,
    }
}

const fn scale(name: &'static str, doc: &'static str) -> ParamInfo {
    ParamInfo {
        name,
        units: "",
        doc,
    }
}

/// The parameters of the full pointing model, in order.
pub const PARAMETERS: &[ParamInfo] = &[
    angle("P1", "[-IA] az offset = encoder bias - tilt around"),
    angle("P2", "az gravitational sag, should be 0.0"),
    angle(
        "P3",
        "[-NPAE] left-right axis skew = non-perpendicularity of az/el axes",
    ),
    angle(
        "P4",
        "[CA] az box offset / collimation error = RF-axis misalignment",
    ),
    angle("P5", "[AN] tilt out = az ring tilted towards north"),
    angle("P6", "[-AW] tilt over = az ring tilted towards east"),
    angle(
        "P7",
        "[IE] el offset = encoder bias - forward axis skew - el box offset",
    ),
    angle(
        "P8",
        "[ECEC/-TF] gravity sag / Hooke law flexure / el centering error",
    ),
    scale("P9", "[PEE1] el excess scale factor"),
    angle("P10", "ad hoc cos(el) term in delta_el, redundant with P8"),
    angle("P11", "[ECES] asymmetric sag / el centering error"),
    scale("P12", "[-PAA1] az excess scale factor"),
    angle("P13", "[ACEC] az centering error"),
    angle("P14", "[-ACES] az centering error"),
    angle("P15", "[HECA2] elevation nod twice per az revolution"),
    angle("P16", "[-HESA2] elevation nod twice per az revolution"),
    angle("P17", "[-HACA2] az encoder tilt"),
    angle("P18", "[HASA2] az encoder tilt"),
    angle("P19", "[HECE8] high-order distortions in el encoder scale"),
    angle("P20", "[HESE8] high-order distortions in el encoder scale"),
    angle("P21", "[-HECA] elevation nod once per az revolution"),
    angle("P22", "[HESA] elevation nod once per az revolution"),
];

const_assert_eq!(PARAMETERS.len(), NUM_POINTING_PARAMS);

/// Get the 0-based index of a parameter from its name (e.g. "P7" -> 6).
pub fn param_index(name: &str) -> Option<usize> {
    PARAMETERS.iter().position(|p| p.name == name)
}

/// Write a parameter value (radians, or unitless) in its text form.
///
/// Zero is always "0". Other values are rounded to 12 significant digits and
/// written in their shortest form, switching to scientific notation for tiny
/// or huge magnitudes.
pub(crate) fn format_value(value: f64, info: &ParamInfo) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let value = if info.is_angle() {
        value.to_degrees()
    } else {
        value
    };
    // Rounding in scientific notation gives significant digits rather than
    // decimal places.
    let rounded: f64 = format!("{value:.11e}").parse().unwrap_or(value);
    if (1e-6..1e12).contains(&rounded.abs()) {
        format!("{rounded}")
    } else {
        format!("{rounded:e}")
    }
}

/// Join the text forms of all parameters into a description string.
pub(crate) fn describe(params: &[f64; NUM_POINTING_PARAMS]) -> String {
    izip!(params.iter(), PARAMETERS.iter())
        .map(|(&value, info)| format_value(value, info))
        .join(", ")
}

/// Parse a single value in degrees. Both decimal degrees ("-1.5") and
/// sexagesimal "D:M:S" ("-1:30:00", also "D:M") are accepted.
pub(crate) fn parse_degrees(token: &str) -> Result<f64, PointingModelError> {
    let token = token.trim();
    let bad_value = || PointingModelError::BadValue(token.to_string());
    if !token.contains(':') {
        return token.parse().map_err(|_| bad_value());
    }

    // The sign belongs to the whole value, not just the degrees field;
    // "-0:30:00" is negative.
    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let mut degrees = 0.0;
    let mut divisor = 1.0;
    for (i, field) in unsigned.split(':').enumerate() {
        if i >= 3 {
            return Err(bad_value());
        }
        let field: f64 = field.trim().parse().map_err(|_| bad_value())?;
        if !field.is_finite() || field < 0.0 {
            return Err(bad_value());
        }
        degrees += field / divisor;
        divisor *= 60.0;
    }
    Ok(if negative { -degrees } else { degrees })
}

/// Parse a description string into parameter values (radians, or unitless for
/// P9 and P12). The values are separated by commas if there are any, otherwise
/// by whitespace. Any number of values is returned; checking the count is up to
/// the caller.
pub(crate) fn parse_description(description: &str) -> Result<Vec<f64>, PointingModelError> {
    let tokens: Vec<&str> = if description.contains(',') {
        description.split(',').map(str::trim).collect()
    } else {
        description.split_whitespace().collect()
    };
    tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            let value = parse_degrees(token)?;
            Ok(match PARAMETERS.get(i) {
                Some(info) if !info.is_angle() => value,
                _ => value.to_radians(),
            })
        })
        .collect()
}

/// Non-zero parameters were thrown away when squeezing too many parameters
/// into the pointing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardedParams {
    /// The number of parameters that were supplied.
    pub received: usize,

    /// How many of the parameters beyond the end of the model were non-zero.
    pub discarded_active: usize,
}

impl std::fmt::Display for DiscardedParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pointing model received too many parameters ({} instead of {}), and {} non-zero parameters will be discarded",
            self.received, NUM_POINTING_PARAMS, self.discarded_active
        )
    }
}

/// Make the supplied values fit the pointing model: use the first
/// [`NUM_POINTING_PARAMS`] values, and set any parameters without a value to
/// zero. This is useful for loading older versions of the model.
///
/// Dropping non-zero values is reported, but the caller decides what to do
/// about it.
pub fn procrustean_assign(values: &[f64]) -> ([f64; NUM_POINTING_PARAMS], Option<DiscardedParams>) {
    let mut params = [0.0; NUM_POINTING_PARAMS];
    let n = values.len().min(NUM_POINTING_PARAMS);
    params[..n].copy_from_slice(&values[..n]);

    let discarded_active = values
        .iter()
        .skip(NUM_POINTING_PARAMS)
        .filter(|&&v| v != 0.0)
        .count();
    let discarded = if discarded_active > 0 {
        Some(DiscardedParams {
            received: values.len(),
            discarded_active,
        })
    } else {
        None
    };
    (params, discarded)
}
