// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Spherical projections.

Project spherical coordinates onto a plane tangent to the sphere at a
reference point, and deproject plane coordinates back onto the sphere. The
projections follow AIPS (Greisen, AIPS Memos 27 and 46; the DIRCOS and NEWPOS
routines) and are referred to by their AIPS/FITS codes (Calabretta & Greisen
2002, A&A 395, 1077). The (x, y) coordinates here are the (l, m) direction
cosines of those memos.

Any spherical coordinate system can be used, as long as the target and
reference points are in the same one. The latitude-like coordinate must be in
`[-π/2, π/2]`; the longitude-like coordinate can be anything. The y axis of
the plane points along the reference meridian towards the north pole, and the
x axis points in the direction of increasing longitude. If the reference point
is at a pole, the axes are the continuation of those obtained while moving
along the reference meridian from the equator to that pole.

The supported projections are all zenithal:

- Orthographic ([`Projection::Sin`]): the standard projection of aperture
  synthesis, tying in with the (l, m) coordinates of the 2D Fourier imaging
  equation. This is the AIPS SIN, not the generalised slant orthographic
  projection of WCSLIB.
- Gnomonic ([`Projection::Tan`]): common in optical astronomy.
- Zenithal equidistant ([`Projection::Arc`]): what you get by plotting
  relative (az, el) directly; preserves angular distances from the reference.
- Stereographic ([`Projection::Stg`]): preserves circles; good for large
  fields and polar regions.

Every function accepts single angles, and has an `_array` variant which
accepts arrays of any dimension, with the reference point broadcast against
the target arrays. All units are radians.
 */

mod error;
#[cfg(test)]
mod tests;

pub use error::ProjectionError;

use itertools::Itertools;
use ndarray::{Array, ArrayView, Dimension, FoldWhile, Zip};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    constants::{PI, SIN_COS_THETA_SLACK, STG_MIN_DENOMINATOR, TAN_MIN_COS_THETA},
    coord::{CoordSystem, Direction, PlanePoint, ReferenceDirections},
    math::{broadcast, check_same_shape, is_valid_latitude},
};

lazy_static::lazy_static! {
    pub(crate) static ref PROJECTION_TYPES_COMMA_SEPARATED: String = Projection::iter().join(", ");
}

/// The family of zenithal projection to use.
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
#[strum(ascii_case_insensitive)]
pub enum Projection {
    /// Orthographic.
    #[strum(serialize = "SIN")]
    #[serde(rename = "SIN")]
    Sin,

    /// Gnomonic.
    #[strum(serialize = "TAN")]
    #[serde(rename = "TAN")]
    Tan,

    /// Zenithal equidistant.
    #[default]
    #[strum(serialize = "ARC")]
    #[serde(rename = "ARC")]
    Arc,

    /// Stereographic.
    #[strum(serialize = "STG")]
    #[serde(rename = "STG")]
    Stg,
}

/// The orthographic projection of a target, which every zenithal projection
/// scales in its own way.
#[derive(Debug, Clone, Copy)]
struct Orthographic {
    /// sin(theta) sin(phi)
    x: f64,
    /// sin(theta) cos(phi)
    y: f64,
    /// theta is the native latitude: 0 at the reference point, increasing
    /// radially outwards.
    cos_theta: f64,
}

fn check_latitude(lat: f64, point: &'static str) -> Result<(), ProjectionError> {
    if is_valid_latitude(lat) {
        Ok(())
    } else {
        Err(ProjectionError::LatitudeOutOfRange { point, lat })
    }
}

/// Do the calculations common to all of the zenithal projections.
fn sphere_to_plane_common(
    reference: Direction,
    target: Direction,
) -> Result<Orthographic, ProjectionError> {
    check_latitude(reference.lat, "reference")?;
    check_latitude(target.lat, "target")?;
    let (sin_el, cos_el) = target.lat.sin_cos();
    let (sin_el0, cos_el0) = reference.lat.sin_cos();
    let (sin_daz, cos_daz) = (target.lon - reference.lon).sin_cos();
    Ok(Orthographic {
        x: cos_el * sin_daz,
        y: sin_el * cos_el0 - cos_el * sin_el0 * cos_daz,
        cos_theta: sin_el * sin_el0 + cos_el * cos_el0 * cos_daz,
    })
}

/// Recover the target from the components of its unit vector in the frame of
/// the reference meridian: `sin_el` is sin(el), `east` is cos(el) sin(daz) and
/// `north` is cos(el) cos(daz). None of these involve cos(el0), so the result
/// stays accurate when the reference is at a pole.
#[inline]
fn direction_from_components(
    reference: Direction,
    sin_el: f64,
    east: f64,
    north: f64,
) -> Direction {
    Direction {
        lon: reference.lon + east.atan2(north),
        lat: sin_el.atan2(east.hypot(north)),
    }
}

impl Projection {
    /// Parse a projection code (e.g. "SIN", "arc"), returning a useful error
    /// if the code isn't recognised.
    pub fn parse(s: &str) -> Result<Projection, ProjectionError> {
        s.trim()
            .parse()
            .map_err(|_| ProjectionError::UnknownProjection {
                input: s.to_string(),
                valid: PROJECTION_TYPES_COMMA_SEPARATED.as_str(),
            })
    }

    /// Project a `target` direction onto the plane tangent to the sphere at
    /// `reference`.
    ///
    /// # Errors
    ///
    /// Either latitude is outside `[-π/2, π/2]`, or the target is outside the
    /// domain of this projection:
    ///
    /// - SIN: more than π/2 from the reference point;
    /// - TAN: π/2 or more from the reference point;
    /// - ARC: never;
    /// - STG: too close to the antipode of the reference point.
    pub fn sphere_to_plane(
        self,
        reference: Direction,
        target: Direction,
    ) -> Result<PlanePoint, ProjectionError> {
        let ortho = sphere_to_plane_common(reference, target)?;
        let scale = match self {
            // x = sin(theta) sin(phi), y = sin(theta) cos(phi)
            Projection::Sin => {
                if ortho.cos_theta < -SIN_COS_THETA_SLACK {
                    return Err(ProjectionError::TargetTooFar {
                        projection: self,
                        limit: "more than pi/2",
                    });
                }
                1.0
            }

            // x = tan(theta) sin(phi), y = tan(theta) cos(phi)
            Projection::Tan => {
                if ortho.cos_theta < TAN_MIN_COS_THETA {
                    return Err(ProjectionError::TargetTooFar {
                        projection: self,
                        limit: "pi/2 or more",
                    });
                }
                1.0 / ortho.cos_theta
            }

            // x = theta sin(phi), y = theta cos(phi)
            Projection::Arc => {
                // The orthographic components have length sin(theta); getting
                // theta from atan2 stays accurate close to the reference point
                // and its antipode.
                let sin_theta = ortho.x.hypot(ortho.y);
                if sin_theta > 0.0 {
                    sin_theta.atan2(ortho.cos_theta) / sin_theta
                } else {
                    1.0
                }
            }

            // x = 2 sin(theta) sin(phi) / (1 + cos(theta)), similarly for y
            Projection::Stg => {
                let den = 1.0 + ortho.cos_theta;
                if den < STG_MIN_DENOMINATOR {
                    return Err(ProjectionError::TargetNearAntipode);
                }
                2.0 / den
            }
        };
        Ok(PlanePoint {
            x: scale * ortho.x,
            y: scale * ortho.y,
        })
    }

    /// Deproject a `point` on the plane tangent to the sphere at `reference`
    /// back onto the sphere.
    ///
    /// # Errors
    ///
    /// The reference latitude is outside `[-π/2, π/2]`, or the point is outside
    /// the range of this projection:
    ///
    /// - SIN: the radius of (x, y) is bigger than 1;
    /// - TAN: never;
    /// - ARC: the radius of (x, y) is bigger than π;
    /// - STG: never.
    pub fn plane_to_sphere(
        self,
        reference: Direction,
        point: PlanePoint,
    ) -> Result<Direction, ProjectionError> {
        check_latitude(reference.lat, "reference")?;
        let PlanePoint { x, y } = point;
        let (sin_el0, cos_el0) = reference.lat.sin_cos();
        let direction = match self {
            Projection::Sin => {
                let sin2_theta = x * x + y * y;
                if sin2_theta > 1.0 + SIN_COS_THETA_SLACK {
                    return Err(ProjectionError::PlaneRadiusTooLarge {
                        projection: self,
                        radius: sin2_theta.sqrt(),
                        max: 1.0,
                    });
                }
                let cos_theta = (1.0 - sin2_theta).max(0.0).sqrt();
                let sin_el = sin_el0 * cos_theta + cos_el0 * y;
                let north = cos_el0 * cos_theta - sin_el0 * y;
                direction_from_components(reference, sin_el, x, north)
            }

            Projection::Tan => {
                // These are the components of the (unnormalised) target
                // vector: cos(el) cos(daz), cos(el) sin(daz), sin(el), all
                // divided by cos(theta).
                let den = cos_el0 - y * sin_el0;
                let up = sin_el0 + y * cos_el0;
                Direction {
                    lon: reference.lon + x.atan2(den),
                    lat: up.atan2(x.hypot(den)),
                }
            }

            Projection::Arc => {
                let theta = x.hypot(y);
                if theta > PI {
                    return Err(ProjectionError::PlaneRadiusTooLarge {
                        projection: self,
                        radius: theta,
                        max: PI,
                    });
                }
                let (sin_theta, cos_theta) = theta.sin_cos();
                let scale = if theta == 0.0 { 1.0 } else { sin_theta / theta };
                // (x, y) scaled back to the orthographic components.
                let (ox, oy) = (x * scale, y * scale);
                let sin_el = cos_el0 * oy + sin_el0 * cos_theta;
                let north = cos_el0 * cos_theta - sin_el0 * oy;
                direction_from_components(reference, sin_el, ox, north)
            }

            Projection::Stg => {
                // This is the square of 2 sin(theta) / (1 + cos(theta)).
                let r2 = x * x + y * y;
                let cos_theta = (4.0 - r2) / (4.0 + r2);
                let scale = (1.0 + cos_theta) / 2.0;
                // The M-check in AIPS NEWPOS is avoided by using atan2 rather
                // than asin, as for ARC; this is much more accurate for large
                // (x, y).
                let (ox, oy) = (x * scale, y * scale);
                let sin_el = cos_el0 * oy + sin_el0 * cos_theta;
                let north = cos_el0 * cos_theta - sin_el0 * oy;
                direction_from_components(reference, sin_el, ox, north)
            }
        };
        Ok(direction)
    }

    /// Project arrays of target points. The reference point (`ref_lon`,
    /// `ref_lat`) is broadcast against the targets (`lon`, `lat`), which must
    /// have the same shape; a scalar reference is a 0-d array.
    ///
    /// If any target fails to project, the first error encountered is
    /// returned.
    pub fn sphere_to_plane_array<D, E>(
        self,
        ref_lon: ArrayView<f64, E>,
        ref_lat: ArrayView<f64, E>,
        lon: ArrayView<f64, D>,
        lat: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), ProjectionError>
    where
        D: Dimension,
        E: Dimension,
    {
        check_same_shape(&lon, "lon", &lat, "lat")?;
        let dim = lon.raw_dim();
        let ref_lon = broadcast(&ref_lon, &dim, "ref_lon")?;
        let ref_lat = broadcast(&ref_lat, &dim, "ref_lat")?;

        let mut x = Array::<f64, D>::zeros(dim.clone());
        let mut y = Array::<f64, D>::zeros(dim);
        Zip::from(&mut x)
            .and(&mut y)
            .and(&ref_lon)
            .and(&ref_lat)
            .and(&lon)
            .and(&lat)
            .fold_while(Ok(()), |_, x, y, &lon0, &lat0, &lon, &lat| {
                match self.sphere_to_plane(Direction::new(lon0, lat0), Direction::new(lon, lat)) {
                    Ok(p) => {
                        *x = p.x;
                        *y = p.y;
                        FoldWhile::Continue(Ok(()))
                    }
                    Err(e) => FoldWhile::Done(Err(e)),
                }
            })
            .into_inner()?;
        Ok((x, y))
    }

    /// Deproject arrays of plane points. The reference point (`ref_lon`,
    /// `ref_lat`) is broadcast against the plane points (`x`, `y`), which must
    /// have the same shape; a scalar reference is a 0-d array.
    ///
    /// If any point fails to deproject, the first error encountered is
    /// returned.
    pub fn plane_to_sphere_array<D, E>(
        self,
        ref_lon: ArrayView<f64, E>,
        ref_lat: ArrayView<f64, E>,
        x: ArrayView<f64, D>,
        y: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), ProjectionError>
    where
        D: Dimension,
        E: Dimension,
    {
        check_same_shape(&x, "x", &y, "y")?;
        let dim = x.raw_dim();
        let ref_lon = broadcast(&ref_lon, &dim, "ref_lon")?;
        let ref_lat = broadcast(&ref_lat, &dim, "ref_lat")?;

        let mut lon = Array::<f64, D>::zeros(dim.clone());
        let mut lat = Array::<f64, D>::zeros(dim);
        Zip::from(&mut lon)
            .and(&mut lat)
            .and(&ref_lon)
            .and(&ref_lat)
            .and(&x)
            .and(&y)
            .fold_while(Ok(()), |_, lon, lat, &lon0, &lat0, &x, &y| {
                match self.plane_to_sphere(Direction::new(lon0, lat0), PlanePoint::new(x, y)) {
                    Ok(d) => {
                        *lon = d.lon;
                        *lat = d.lat;
                        FoldWhile::Continue(Ok(()))
                    }
                    Err(e) => FoldWhile::Done(Err(e)),
                }
            })
            .into_inner()?;
        Ok((lon, lat))
    }
}

/// Project a target onto the plane tangent at (`ref_lon`, `ref_lat`), with all
/// angles as plain floats. This is a convenience wrapper around
/// [`Projection::sphere_to_plane`].
pub fn sphere_to_plane(
    projection: Projection,
    ref_lon: f64,
    ref_lat: f64,
    lon: f64,
    lat: f64,
) -> Result<(f64, f64), ProjectionError> {
    projection
        .sphere_to_plane(Direction::new(ref_lon, ref_lat), Direction::new(lon, lat))
        .map(|p| (p.x, p.y))
}

/// Deproject a point on the plane tangent at (`ref_lon`, `ref_lat`), with all
/// angles as plain floats. This is a convenience wrapper around
/// [`Projection::plane_to_sphere`].
pub fn plane_to_sphere(
    projection: Projection,
    ref_lon: f64,
    ref_lat: f64,
    x: f64,
    y: f64,
) -> Result<(f64, f64), ProjectionError> {
    projection
        .plane_to_sphere(Direction::new(ref_lon, ref_lat), PlanePoint::new(x, y))
        .map(|d| (d.lon, d.lat))
}

/// A projection paired with the reference direction it is tangent at, e.g. the
/// position of a tracked target for plotting scan offsets around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPlane {
    pub projection: Projection,
    pub reference: Direction,
}

impl TangentPlane {
    pub fn new(projection: Projection, reference: Direction) -> Result<Self, ProjectionError> {
        check_latitude(reference.lat, "reference")?;
        Ok(Self {
            projection,
            reference,
        })
    }

    /// Make a tangent plane at a reference target, choosing which of its
    /// positions to use with `coord_system`.
    pub fn from_references(
        projection: Projection,
        references: &ReferenceDirections,
        coord_system: CoordSystem,
    ) -> Result<Self, ProjectionError> {
        Self::new(projection, references.get(coord_system))
    }

    pub fn sphere_to_plane(&self, target: Direction) -> Result<PlanePoint, ProjectionError> {
        self.projection.sphere_to_plane(self.reference, target)
    }

    pub fn plane_to_sphere(&self, point: PlanePoint) -> Result<Direction, ProjectionError> {
        self.projection.plane_to_sphere(self.reference, point)
    }

    pub fn sphere_to_plane_array<D: Dimension>(
        &self,
        lon: ArrayView<f64, D>,
        lat: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), ProjectionError> {
        self.projection.sphere_to_plane_array(
            ndarray::aview0(&self.reference.lon),
            ndarray::aview0(&self.reference.lat),
            lon,
            lat,
        )
    }

    pub fn plane_to_sphere_array<D: Dimension>(
        &self,
        x: ArrayView<f64, D>,
        y: ArrayView<f64, D>,
    ) -> Result<(Array<f64, D>, Array<f64, D>), ProjectionError> {
        self.projection.plane_to_sphere_array(
            ndarray::aview0(&self.reference.lon),
            ndarray::aview0(&self.reference.lat),
            x,
            y,
        )
    }
}
