use salinity_convert::pressure::SENSOR_DEPTH_M;
use salinity_convert::{PressureEstimator, depth_from_pressure, normal_gravity};

#[test]
fn depth_is_strictly_increasing_in_pressure() {
    for lat_deg in [0.0, 30.134, 60.0, 90.0] {
        let g = normal_gravity(f64::to_radians(lat_deg));
        let mut previous = depth_from_pressure(0.0, g);
        for step in 1..=2000 {
            let p = step as f64 * 5.0;
            let depth = depth_from_pressure(p, g);
            assert!(
                depth > previous,
                "depth not increasing at p={p} lat={lat_deg}: {depth} <= {previous}"
            );
            previous = depth;
        }
    }
}

#[test]
fn estimated_pressure_round_trips_to_sensor_depth() {
    let estimator = PressureEstimator::default();
    for lat_deg in [-90.0, -45.0, -10.0, 0.0, 15.5, 30.134, 45.0, 75.0, 90.0] {
        let p = estimator.estimate(lat_deg).unwrap();
        let g = normal_gravity(f64::to_radians(lat_deg));
        let depth = depth_from_pressure(p, g);
        assert!(
            (depth - SENSOR_DEPTH_M).abs() < 1e-10,
            "lat {lat_deg}: depth {depth} from p {p}"
        );
        assert!(p > 0.25 && p < 0.26, "lat {lat_deg}: p {p}");
    }
}

#[test]
fn pressure_grows_with_latitude_in_the_northern_hemisphere() {
    let estimator = PressureEstimator::default();
    let equator = estimator.estimate(0.0).unwrap();
    let mid = estimator.estimate(45.0).unwrap();
    let pole = estimator.estimate(90.0).unwrap();
    assert!(equator < mid && mid < pole);
}
