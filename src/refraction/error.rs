// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with refraction correction.

use thiserror::Error;

use crate::math::ShapeError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefractionError {
    #[error("Unknown refraction correction model '{input}' - should be one of: {valid}")]
    UnknownModel { input: String, valid: &'static str },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
