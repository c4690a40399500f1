// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with spherical projections.

use thiserror::Error;

use super::Projection;
use crate::math::ShapeError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("The {point} latitude ({lat} radians) is outside [-pi/2, pi/2]")]
    LatitudeOutOfRange { point: &'static str, lat: f64 },

    #[error("Target point is {limit} radians away from the reference point; this is outside the domain of the {projection} projection")]
    TargetTooFar {
        projection: Projection,
        limit: &'static str,
    },

    #[error("Target point is too close to the antipode of the reference point for the STG projection")]
    TargetNearAntipode,

    #[error("The plane point has radius {radius}, which is bigger than the {projection} projection's limit of {max}")]
    PlaneRadiusTooLarge {
        projection: Projection,
        radius: f64,
        max: f64,
    },

    #[error("Unrecognised projection '{input}'; supported projections are: {valid}")]
    UnknownProjection { input: String, valid: &'static str },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}
