//! Hydrostatic pressure at a fixed, shallow sensor depth.
//!
//! The forward relation is the UNESCO (Saunders & Fofonoff) depth formula,
//! `depth(p)` in metres for pressure `p` in decibars, with latitude-dependent
//! normal gravity. Pressure is recovered by inverting it numerically with a
//! bracketed root finder, so no closed-form inverse is needed.
//!
//! Latitude handling: `g(lat)` takes radians. [`PressureEstimator::estimate`]
//! converts according to its configured [`LatitudeUnit`] (degrees by default).

pub mod solver;

use tracing::trace;

use crate::error::ConversionError;
use crate::models::{ConversionOptions, LatitudeUnit};
use solver::brent;

/// Depth of the sensor below the surface (m).
pub const SENSOR_DEPTH_M: f64 = 0.254;
/// Pressure assumed when latitude is unavailable (dbar).
pub const DEFAULT_PRESSURE_DBAR: f64 = 0.257;

/// Equatorial normal gravity (m/s²).
pub const GRAVITY_EQUATOR: f64 = 9.780318;
const GRAVITY_SIN2: f64 = 5.2788e-3;
const GRAVITY_SIN3: f64 = 2.36e-5;

const DEPTH_C1: f64 = 9.72659;
const DEPTH_C2: f64 = -2.2512e-5;
const DEPTH_C3: f64 = 2.279e-10;
const DEPTH_C4: f64 = -1.82e-15;
/// Mean vertical gradient of gravity (m/s² per dbar).
const GAMMA: f64 = 2.184e-6;

const DEFAULT_BRACKET_UPPER_DBAR: f64 = 1.0;

/// Normal gravity (m/s²) at `lat_rad` radians.
pub fn normal_gravity(lat_rad: f64) -> f64 {
    let s = lat_rad.sin();
    GRAVITY_EQUATOR * (1.0 + GRAVITY_SIN2 * s * s + GRAVITY_SIN3 * s * s * s)
}

/// Depth (m) corresponding to pressure `p_dbar` under gravity `g`.
///
/// Strictly increasing in `p_dbar` for `p_dbar >= 0` over the oceanic range.
pub fn depth_from_pressure(p_dbar: f64, g: f64) -> f64 {
    let p = p_dbar;
    let numerator = p * (DEPTH_C1 + p * (DEPTH_C2 + p * (DEPTH_C3 + p * DEPTH_C4)));
    numerator / (g + 0.5 * GAMMA * p)
}

/// Inverts [`depth_from_pressure`] for a sensor at a fixed depth.
#[derive(Clone, Debug, PartialEq)]
pub struct PressureEstimator {
    depth_m: f64,
    unit: LatitudeUnit,
    bracket: (f64, f64),
    tolerance: f64,
    max_iterations: usize,
}

impl Default for PressureEstimator {
    fn default() -> Self {
        Self::new(SENSOR_DEPTH_M)
    }
}

impl PressureEstimator {
    /// Estimator for a sensor at `depth_m` metres, latitude in degrees.
    ///
    /// The search bracket is `[0, 1]` dbar, widened to `[0, 2·depth]` for
    /// sensors deeper than half a metre.
    pub fn new(depth_m: f64) -> Self {
        Self {
            depth_m,
            unit: LatitudeUnit::Degrees,
            bracket: (0.0, DEFAULT_BRACKET_UPPER_DBAR.max(2.0 * depth_m)),
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }

    pub fn from_options(options: &ConversionOptions) -> Self {
        Self::new(options.sensor_depth_m)
            .with_latitude_unit(options.latitude_unit)
            .with_tolerance(options.solver_tolerance_dbar, options.solver_max_iterations)
    }

    pub fn with_latitude_unit(mut self, unit: LatitudeUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_bracket(mut self, lower_dbar: f64, upper_dbar: f64) -> Self {
        self.bracket = (lower_dbar, upper_dbar);
        self
    }

    pub fn with_tolerance(mut self, tolerance_dbar: f64, max_iterations: usize) -> Self {
        self.tolerance = tolerance_dbar;
        self.max_iterations = max_iterations;
        self
    }

    /// Pressure (dbar) at the sensor depth for the given latitude.
    pub fn estimate(&self, latitude: f64) -> Result<f64, ConversionError> {
        if !latitude.is_finite() {
            return Err(ConversionError::invalid(
                "latitude",
                format!("not a finite number: {latitude}"),
            ));
        }
        let g = normal_gravity(self.unit.to_radians(latitude));
        let target = self.depth_m;
        let (lower, upper) = self.bracket;

        let root = brent(
            |p| depth_from_pressure(p, g) - target,
            lower,
            upper,
            self.tolerance,
            self.max_iterations,
        )
        .map_err(|source| ConversionError::PressureInversion {
            latitude,
            bracket: self.bracket,
            source,
        })?;

        trace!(
            latitude,
            gravity = g,
            pressure_dbar = root.x,
            iterations = root.iterations,
            "pressure inverted"
        );
        Ok(root.x)
    }
}

#[cfg(test)]
mod tests {
    use super::solver::SolverError;
    use super::*;

    #[test]
    fn gravity_increases_towards_the_poles() {
        let equator = normal_gravity(0.0);
        let pole = normal_gravity(90f64.to_radians());
        assert_eq!(equator, GRAVITY_EQUATOR);
        assert!(pole > equator);
        assert!((pole - 9.8321).abs() < 1e-3);
    }

    #[test]
    fn depth_is_zero_at_zero_pressure() {
        assert_eq!(depth_from_pressure(0.0, normal_gravity(0.5)), 0.0);
    }

    #[test]
    fn estimate_at_equator_matches_hand_inversion() {
        let p = PressureEstimator::default().estimate(0.0).unwrap();
        assert!((p - 0.255_403_210_304_191_4).abs() < 1e-9, "p = {p}");
    }

    #[test]
    fn radians_mode_reproduces_legacy_default_pressure() {
        // sin() of the raw value 30.134, as the legacy conversion did.
        let p = PressureEstimator::default()
            .with_latitude_unit(LatitudeUnit::Radians)
            .estimate(30.134)
            .unwrap();
        assert!((p - 0.256_636_715_855_763_4).abs() < 1e-9, "p = {p}");
        assert!((p - DEFAULT_PRESSURE_DBAR).abs() < 1e-3);
    }

    #[test]
    fn degrees_and_radians_agree_when_converted() {
        let deg = PressureEstimator::default().estimate(30.134).unwrap();
        let rad = PressureEstimator::default()
            .with_latitude_unit(LatitudeUnit::Radians)
            .estimate(30.134f64.to_radians())
            .unwrap();
        assert!((deg - rad).abs() < 1e-12);
        assert!((deg - 0.255_743_763_128_454_8).abs() < 1e-9, "p = {deg}");
    }

    #[test]
    fn bracket_without_root_is_an_inversion_error() {
        let err = PressureEstimator::default()
            .with_bracket(0.5, 1.0)
            .estimate(45.0)
            .unwrap_err();
        match &err {
            ConversionError::PressureInversion {
                latitude, bracket, ..
            } => {
                assert_eq!(*latitude, 45.0);
                assert_eq!(*bracket, (0.5, 1.0));
            }
            other => panic!("unexpected error: {other}"),
        }
        let source = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<SolverError>())
            .expect("solver error kept as source");
        assert!(matches!(source, SolverError::NoSignChange { .. }));
    }

    #[test]
    fn non_finite_latitude_is_invalid_input() {
        let err = PressureEstimator::default().estimate(f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidInput {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn deeper_sensor_widens_the_bracket() {
        let p = PressureEstimator::new(3.0).estimate(45.0).unwrap();
        let g = normal_gravity(45f64.to_radians());
        assert!((depth_from_pressure(p, g) - 3.0).abs() < 1e-9);
    }
}
