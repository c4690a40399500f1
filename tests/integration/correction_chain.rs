// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests that chain the refraction, pointing and projection corrections
//! together, the way an antenna controller uses them.

use approx::assert_abs_diff_eq;
use ndarray::aview0;

use crate::*;
use antenna_pointing::{
    constants::ARCSEC, math::angle_difference, AzEl, CoordSystem, Direction, EnabledParams,
    PlanePoint, PointingError, Projection, ReferenceDirections, RefractionCorrection,
    TangentPlane, Weather,
};

#[test]
fn test_commanded_position_round_trip() {
    let pm = typical_pointing_model();
    let rc = RefractionCorrection::default();
    let weather = Weather::new(15.0, 1005.0, 40.0);
    let (az, el) = sky_spiral(200);

    // Target -> apparent -> commanded.
    let t = aview0(&weather.temperature_c);
    let p = aview0(&weather.pressure_hpa);
    let h = aview0(&weather.humidity_percent);
    let apparent_el = rc.apply_array(el.view(), t, p, h).unwrap();
    let (commanded_az, commanded_el) = pm.apply_array(az.view(), apparent_el.view()).unwrap();

    // Commanded -> apparent -> target.
    let solution = pm
        .reverse_array(commanded_az.view(), commanded_el.view())
        .unwrap();
    assert!(solution.converged(), "{:?}", solution.warning);
    let (apparent_az, apparent_el2) = solution.into_value();
    let solution = rc.reverse_array(apparent_el2.view(), t, p, h).unwrap();
    assert!(solution.converged(), "{:?}", solution.warning);
    let target_el = solution.into_value();

    for i in 0..az.len() {
        assert_abs_diff_eq!(angle_difference(apparent_az[i], az[i]), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(target_el[i], el[i], epsilon = 1e-6);

        // The scalar forms agree.
        let (cmd_az, cmd_el) = pm.apply(az[i], rc.apply(el[i], &weather));
        assert_eq!(cmd_az, commanded_az[i]);
        assert_eq!(cmd_el, commanded_el[i]);
    }
}

#[test]
fn test_fit_recovers_model_from_offsets() {
    let truth = typical_pointing_model();
    let (az, el) = sky_spiral(300);
    let (delta_az, delta_el) = truth.offset_array(az.view(), el.view()).unwrap();

    let mut fitted = antenna_pointing::PointingModel::new();
    let result = fitted
        .fit(
            az.view(),
            el.view(),
            delta_az.view(),
            delta_el.view(),
            None,
            None,
            &EnabledParams::default(),
        )
        .unwrap();
    assert!(result.condition_number.is_some());
    for (a, b) in fitted.params().iter().zip(truth.params()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-3 * ARCSEC);
    }
}

#[test]
fn test_scan_offsets_around_target() {
    let references = ReferenceDirections::new(
        Direction::new_degrees(120.0, 45.0),
        Direction::new_degrees(83.6, 22.0),
    );
    for projection in [
        Projection::Sin,
        Projection::Tan,
        Projection::Arc,
        Projection::Stg,
    ] {
        let plane =
            TangentPlane::from_references(projection, &references, CoordSystem::AzEl).unwrap();
        assert_eq!(plane.reference, references.azel);

        // A scan point one degree "up" on the plane sits about a degree above
        // the target.
        let scan = AzEl::from(plane.plane_to_sphere(PlanePoint::new(0.0, 0.0175)).unwrap());
        assert_abs_diff_eq!(scan.az, references.azel.lon, epsilon = 1e-12);
        assert_abs_diff_eq!(scan.el - references.azel.lat, 0.0175, epsilon = 1e-5);

        // And it projects back to where it came from.
        let back = plane.sphere_to_plane(scan.into()).unwrap();
        assert_abs_diff_eq!(back.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, 0.0175, epsilon = 1e-12);
    }
}

#[test]
fn test_errors_convert_to_crate_error() {
    fn project() -> Result<PlanePoint, PointingError> {
        let plane = TangentPlane::new(Projection::Sin, Direction::new(0.0, 0.0))?;
        Ok(plane.sphere_to_plane(Direction::new(std::f64::consts::PI, 0.0))?)
    }
    let result = project();
    assert!(matches!(result, Err(PointingError::Projection(_))));

    fn model() -> Result<(), PointingError> {
        RefractionCorrection::new("Bennett")?;
        Ok(())
    }
    assert!(matches!(model(), Err(PointingError::Refraction(_))));
}
