// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Corrections for pointing a steerable radio antenna.

This crate provides three independent pieces:

- spherical projections (SIN, TAN, ARC and STG) between a sphere and a plane
  tangent to it at a reference direction;
- a 22-parameter pointing model that maps the requested (az, el) of a target
  to the (az, el) the mount must be commanded to, and back again;
- a refraction correction that maps the topocentric elevation of a target to
  its apparent elevation under given weather, and back again.

Every correction has a scalar form and an array form. The array forms accept
[`ndarray`] arrays of any dimension; weather and reference directions may also
be 0-d arrays, which broadcast over the other inputs.
 */

pub mod constants;
pub mod coord;
pub mod error;
pub mod math;
pub mod model_file;
pub mod pointing;
pub mod projection;
pub mod refraction;

// Re-exports.
pub use coord::{AzEl, CoordSystem, Direction, PlanePoint, ReferenceDirections};
pub use error::PointingError;
pub use math::{ConvergenceWarning, Solution};
pub use model_file::{load_model, save_model, Header, Model};
pub use pointing::{EnabledParams, FittedParams, PointingModel};
pub use projection::{Projection, TangentPlane};
pub use refraction::{RefractionCorrection, RefractionModel, Weather};
