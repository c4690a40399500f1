// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all antenna-pointing-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PointingError {
    #[error("{0}")]
    Projection(#[from] crate::projection::ProjectionError),

    #[error("{0}")]
    PointingModel(#[from] crate::pointing::PointingModelError),

    #[error("{0}")]
    Refraction(#[from] crate::refraction::RefractionError),

    #[error("{0}")]
    ModelFile(#[from] crate::model_file::ModelFileError),

    #[error("{0}")]
    Shape(#[from] crate::math::ShapeError),
}
