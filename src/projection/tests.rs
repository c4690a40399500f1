// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::FRAC_PI_4;

use approx::assert_abs_diff_eq;
use ndarray::{array, aview0, Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::*;
use crate::{
    constants::FRAC_PI_2,
    math::{angle_difference, ShapeError},
};

const ALL: [Projection; 4] = [
    Projection::Sin,
    Projection::Tan,
    Projection::Arc,
    Projection::Stg,
];

/// The largest plane radius that closure tests use for each projection, well
/// inside where deprojection gets ill conditioned.
fn max_test_radius(projection: Projection) -> f64 {
    match projection {
        Projection::Sin => 0.95,
        Projection::Tan => 10.0,
        Projection::Arc => 3.0,
        Projection::Stg => 10.0,
    }
}

#[test]
fn test_parse_projection() {
    assert_eq!(Projection::parse("SIN").unwrap(), Projection::Sin);
    assert_eq!(Projection::parse("tan").unwrap(), Projection::Tan);
    assert_eq!(Projection::parse(" Arc ").unwrap(), Projection::Arc);
    assert_eq!(Projection::parse("STG").unwrap(), Projection::Stg);
    assert_eq!(Projection::default(), Projection::Arc);
    assert_eq!(Projection::Stg.to_string(), "STG");

    let result = Projection::parse("CAR");
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(matches!(err, ProjectionError::UnknownProjection { .. }));
    assert!(err.to_string().contains("SIN, TAN, ARC, STG"), "{err}");
}

#[test]
fn test_sin_corners() {
    let p = Projection::Sin;
    let (x, y) = sphere_to_plane(p, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0);
    assert_abs_diff_eq!(y, 0.0);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, FRAC_PI_2, 0.0).unwrap();
    assert_abs_diff_eq!(x, 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-15);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, -FRAC_PI_2, 0.0).unwrap();
    assert_abs_diff_eq!(x, -1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-15);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, 0.0, FRAC_PI_2).unwrap();
    assert_abs_diff_eq!(x, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 1.0, epsilon = 1e-15);

    // Reference at the pole; the plane axes continue those from the reference
    // meridian.
    let (x, y) = sphere_to_plane(p, 0.0, FRAC_PI_2, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, -1.0, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(az, 0.0);
    assert_abs_diff_eq!(el, 0.0);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 1.0, 0.0).unwrap();
    assert_abs_diff_eq!(az, FRAC_PI_2, epsilon = 1e-15);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 0.0, 1.0).unwrap();
    assert_abs_diff_eq!(az, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(el, FRAC_PI_2, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, FRAC_PI_2, 0.0, -1.0).unwrap();
    assert_abs_diff_eq!(az, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-15);
}

#[test]
fn test_sin_domain() {
    let p = Projection::Sin;
    let result = sphere_to_plane(p, 0.0, 0.0, PI, 0.0);
    assert!(matches!(
        result,
        Err(ProjectionError::TargetTooFar {
            projection: Projection::Sin,
            ..
        })
    ));
    let result = plane_to_sphere(p, 0.0, 0.0, 1.5, 0.0);
    assert!(matches!(
        result,
        Err(ProjectionError::PlaneRadiusTooLarge { .. })
    ));
    let result = plane_to_sphere(p, 0.0, 0.0, 0.8, 0.8);
    assert!(result.is_err());
}

#[test]
fn test_tan_corners() {
    let p = Projection::Tan;
    let (x, y) = sphere_to_plane(p, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0);
    assert_abs_diff_eq!(y, 0.0);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, FRAC_PI_4, 0.0).unwrap();
    assert_abs_diff_eq!(x, 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-15);

    // 90 degrees away is at infinity.
    let result = sphere_to_plane(p, 0.0, 0.0, FRAC_PI_2, 0.0);
    assert!(matches!(
        result,
        Err(ProjectionError::TargetTooFar {
            projection: Projection::Tan,
            ..
        })
    ));
    assert!(sphere_to_plane(p, 0.0, 0.0, PI, 0.0).is_err());

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 1.0, 0.0).unwrap();
    assert_abs_diff_eq!(az, FRAC_PI_4, epsilon = 1e-15);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, FRAC_PI_2, 0.0, -1.0).unwrap();
    assert_abs_diff_eq!(az, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(el, FRAC_PI_4, epsilon = 1e-15);

    // Any point on the plane is fine, no matter how far out.
    assert!(plane_to_sphere(p, 0.0, 0.0, 1e6, -1e6).is_ok());
}

#[test]
fn test_arc_corners() {
    let p = Projection::Arc;
    let (x, y) = sphere_to_plane(p, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0);
    assert_abs_diff_eq!(y, 0.0);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, FRAC_PI_2, 0.0).unwrap();
    assert_abs_diff_eq!(x, FRAC_PI_2, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-15);

    // The antipode is still inside the domain.
    let (x, y) = sphere_to_plane(p, 0.0, 0.0, PI, 0.0).unwrap();
    assert_abs_diff_eq!(x, PI, epsilon = 1e-12);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);

    let (x, y) = sphere_to_plane(p, 0.0, FRAC_PI_2, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, -FRAC_PI_2, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, FRAC_PI_2, 0.0).unwrap();
    assert_abs_diff_eq!(az, FRAC_PI_2, epsilon = 1e-15);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 0.0, FRAC_PI_2).unwrap();
    assert_abs_diff_eq!(az, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(el, FRAC_PI_2, epsilon = 1e-15);

    let result = plane_to_sphere(p, 0.0, 0.0, 4.0, 0.0);
    assert!(matches!(
        result,
        Err(ProjectionError::PlaneRadiusTooLarge {
            projection: Projection::Arc,
            ..
        })
    ));
}

#[test]
fn test_stg_corners() {
    let p = Projection::Stg;
    let (x, y) = sphere_to_plane(p, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(x, 0.0);
    assert_abs_diff_eq!(y, 0.0);

    let (x, y) = sphere_to_plane(p, 0.0, 0.0, FRAC_PI_2, 0.0).unwrap();
    assert_abs_diff_eq!(x, 2.0, epsilon = 1e-15);
    assert_abs_diff_eq!(y, 0.0, epsilon = 1e-15);

    let result = sphere_to_plane(p, 0.0, 0.0, PI, 0.0);
    assert!(matches!(result, Err(ProjectionError::TargetNearAntipode)));

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 2.0, 0.0).unwrap();
    assert_abs_diff_eq!(az, FRAC_PI_2, epsilon = 1e-15);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-15);

    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 0.0, -2.0).unwrap();
    assert_abs_diff_eq!(az, 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(el, -FRAC_PI_2, epsilon = 1e-15);

    // Far out on the plane approaches the antipode.
    let (az, el) = plane_to_sphere(p, 0.0, 0.0, 1e8, 0.0).unwrap();
    assert_abs_diff_eq!(az.abs(), PI, epsilon = 1e-7);
    assert_abs_diff_eq!(el, 0.0, epsilon = 1e-7);
}

#[test]
fn test_latitude_out_of_range() {
    for p in ALL {
        let result = sphere_to_plane(p, 0.0, 2.0, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(ProjectionError::LatitudeOutOfRange {
                point: "reference",
                ..
            })
        ));
        let result = sphere_to_plane(p, 0.0, 0.0, 0.0, -2.0);
        assert!(matches!(
            result,
            Err(ProjectionError::LatitudeOutOfRange {
                point: "target",
                ..
            })
        ));
        let result = plane_to_sphere(p, 0.0, -1.6, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(ProjectionError::LatitudeOutOfRange { .. })
        ));
    }
}

#[test]
fn test_plane_sphere_plane_closure() {
    let mut rng = StdRng::seed_from_u64(42);
    for p in ALL {
        let max_r = max_test_radius(p);
        for _ in 0..1000 {
            let reference = Direction::new(
                rng.random_range(-PI..PI),
                rng.random_range(-FRAC_PI_2..FRAC_PI_2),
            );
            let r = max_r * rng.random_range(0.0..1.0_f64).sqrt();
            let angle = rng.random_range(-PI..PI);
            let point = PlanePoint::new(r * angle.sin(), r * angle.cos());

            let target = p.plane_to_sphere(reference, point).unwrap();
            let result = p.sphere_to_plane(reference, target).unwrap();
            assert_abs_diff_eq!(result.x, point.x, epsilon = 1e-8);
            assert_abs_diff_eq!(result.y, point.y, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_sphere_plane_sphere_closure() {
    let mut rng = StdRng::seed_from_u64(42);
    for p in ALL {
        for _ in 0..1000 {
            let reference = Direction::new(
                rng.random_range(-PI..PI),
                rng.random_range(-1.5..1.5),
            );
            // Targets well inside every domain, and away from the poles.
            let target = Direction::new(
                reference.lon + rng.random_range(-0.5..0.5),
                reference.lat + rng.random_range(-0.5..0.5),
            );
            if target.lat.abs() > 1.5 {
                continue;
            }

            let point = p.sphere_to_plane(reference, target).unwrap();
            let result = p.plane_to_sphere(reference, point).unwrap();
            assert_abs_diff_eq!(result.separation(&target), 0.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_closure_with_polar_reference() {
    let mut rng = StdRng::seed_from_u64(7);
    for p in ALL {
        for pole in [FRAC_PI_2, -FRAC_PI_2] {
            let reference = Direction::new(rng.random_range(-PI..PI), pole);
            for _ in 0..200 {
                // Targets within 80 degrees of the pole are in every domain.
                let colatitude = rng.random_range(0.01..1.4_f64);
                let target = Direction::new(
                    rng.random_range(-PI..PI),
                    pole.signum() * (FRAC_PI_2 - colatitude),
                );

                let point = p.sphere_to_plane(reference, target).unwrap();
                let result = p.plane_to_sphere(reference, point).unwrap();
                assert_abs_diff_eq!(
                    angle_difference(result.lon, target.lon),
                    0.0,
                    epsilon = 1e-10
                );
                assert_abs_diff_eq!(result.lat, target.lat, epsilon = 1e-10);

                let back = p.sphere_to_plane(reference, result).unwrap();
                assert_abs_diff_eq!(back.x, point.x, epsilon = 1e-10);
                assert_abs_diff_eq!(back.y, point.y, epsilon = 1e-10);
            }
        }

        // Zenith-centred scans are the common case.
        let zenith = Direction::new(0.0, FRAC_PI_2);
        let target = Direction::new(2.0, 1.0);
        let point = p.sphere_to_plane(zenith, target).unwrap();
        let result = p.plane_to_sphere(zenith, point).unwrap();
        assert_abs_diff_eq!(result.separation(&target), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.lon, 2.0, epsilon = 1e-12);
    }
}

#[test]
fn test_arc_preserves_distance() {
    let reference = Direction::new_degrees(30.0, 45.0);
    let target = Direction::new_degrees(100.0, -10.0);
    let point = Projection::Arc.sphere_to_plane(reference, target).unwrap();
    assert_abs_diff_eq!(
        point.radius(),
        reference.separation(&target),
        epsilon = 1e-14
    );
}

#[test]
fn test_arrays_match_scalars() {
    let mut rng = StdRng::seed_from_u64(7);
    let lon0 = 0.3;
    let lat0 = 0.6;
    let lon = Array2::from_shape_fn((4, 5), |_| lon0 + rng.random_range(-0.3..0.3));
    let lat = Array2::from_shape_fn((4, 5), |_| lat0 + rng.random_range(-0.3..0.3));

    for p in ALL {
        let (x, y) = p
            .sphere_to_plane_array(aview0(&lon0), aview0(&lat0), lon.view(), lat.view())
            .unwrap();
        assert_eq!(x.dim(), (4, 5));
        for ((&x, &y), (&lon, &lat)) in x.iter().zip(y.iter()).zip(lon.iter().zip(lat.iter())) {
            let (ex, ey) = sphere_to_plane(p, lon0, lat0, lon, lat).unwrap();
            assert_abs_diff_eq!(x, ex);
            assert_abs_diff_eq!(y, ey);
        }

        let (lon2, lat2) = p
            .plane_to_sphere_array(aview0(&lon0), aview0(&lat0), x.view(), y.view())
            .unwrap();
        for ((&x, &y), (&lon, &lat)) in x.iter().zip(y.iter()).zip(lon2.iter().zip(lat2.iter())) {
            let (elon, elat) = plane_to_sphere(p, lon0, lat0, x, y).unwrap();
            assert_abs_diff_eq!(lon, elon);
            assert_abs_diff_eq!(lat, elat);
        }
        assert_abs_diff_eq!(lat2, lat, epsilon = 1e-10);
    }
}

#[test]
fn test_arrays_with_per_element_references() {
    let ref_lon = array![0.0, 1.0, 2.0];
    let ref_lat = array![0.0, 0.5, -0.5];
    let lon = array![0.1, 1.1, 2.1];
    let lat = array![0.0, 0.5, -0.5];
    let (x, y) = Projection::Sin
        .sphere_to_plane_array(ref_lon.view(), ref_lat.view(), lon.view(), lat.view())
        .unwrap();
    for i in 0..3 {
        let (ex, ey) = sphere_to_plane(Projection::Sin, ref_lon[i], ref_lat[i], lon[i], lat[i])
            .unwrap();
        assert_abs_diff_eq!(x[i], ex);
        assert_abs_diff_eq!(y[i], ey);
    }
}

#[test]
fn test_array_errors() {
    let lon = Array1::<f64>::zeros(3);
    let lat = Array1::<f64>::zeros(4);
    let result =
        Projection::Arc.sphere_to_plane_array(aview0(&0.0), aview0(&0.0), lon.view(), lat.view());
    assert!(matches!(
        result,
        Err(ProjectionError::Shape(ShapeError::Mismatch { .. }))
    ));

    let lat = Array1::<f64>::zeros(3);
    let ref_lon = Array1::<f64>::zeros(2);
    let ref_lat = Array1::<f64>::zeros(2);
    let result = Projection::Arc.sphere_to_plane_array(
        ref_lon.view(),
        ref_lat.view(),
        lon.view(),
        lat.view(),
    );
    assert!(matches!(
        result,
        Err(ProjectionError::Shape(ShapeError::Broadcast { .. }))
    ));

    // The first bad element is reported.
    let lon = array![0.0, PI, 0.1];
    let lat = array![0.0, 0.0, 3.0];
    let result =
        Projection::Sin.sphere_to_plane_array(aview0(&0.0), aview0(&0.0), lon.view(), lat.view());
    assert!(matches!(
        result,
        Err(ProjectionError::TargetTooFar { .. })
    ));
}

#[test]
fn test_tangent_plane() {
    let refs = ReferenceDirections::new(
        Direction::new_degrees(120.0, 40.0),
        Direction::new_degrees(200.0, -30.0),
    );
    let plane = TangentPlane::from_references(Projection::Arc, &refs, CoordSystem::RaDec).unwrap();
    assert_eq!(plane.reference, refs.radec);

    let target = Direction::new_degrees(201.0, -29.0);
    let point = plane.sphere_to_plane(target).unwrap();
    let back = plane.plane_to_sphere(point).unwrap();
    assert_abs_diff_eq!(back.separation(&target), 0.0, epsilon = 1e-12);

    let (x, y) = plane
        .sphere_to_plane_array(array![target.lon].view(), array![target.lat].view())
        .unwrap();
    assert_abs_diff_eq!(x[0], point.x);
    assert_abs_diff_eq!(y[0], point.y);
    let (lon, lat) = plane.plane_to_sphere_array(x.view(), y.view()).unwrap();
    assert_abs_diff_eq!(lon[0], back.lon);
    assert_abs_diff_eq!(lat[0], back.lat);

    let result = TangentPlane::new(Projection::Tan, Direction::new(0.0, 2.0));
    assert!(result.is_err());
}
