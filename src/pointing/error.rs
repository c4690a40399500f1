// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with the pointing model.

use thiserror::Error;

use crate::{constants::NUM_POINTING_PARAMS, math::ShapeError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointingModelError {
    #[error("Pointing model expects exactly {n} parameters, but received {0} (use a non-strict load to pad or truncate)", n = NUM_POINTING_PARAMS)]
    WrongParamCount(usize),

    #[error("Pointing model parameter index {0} is invalid; indices start at 1 and go up to {n}", n = NUM_POINTING_PARAMS)]
    BadParamIndex(usize),

    #[error("A mask of enabled pointing model parameters must have {n} elements, but it has {0}", n = NUM_POINTING_PARAMS)]
    BadMaskLength(usize),

    #[error("Could not parse pointing model value '{0}' as degrees (decimal or D:M:S)")]
    BadValue(String),

    #[error("Unknown pointing model parameter '{0}'")]
    UnknownParam(String),

    #[error("Cannot fit a pointing model without any measurements")]
    NoData,

    #[error("Cannot fit a pointing model: {name}[{index}] is not finite")]
    NonFiniteFitData { name: &'static str, index: usize },

    #[error("Cannot fit a pointing model: {name}[{index}] is {value}, but standard deviations must be positive and finite")]
    BadSigma {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("The singular value decomposition of the pointing model design matrix failed")]
    SvdFailed,

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
