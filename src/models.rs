use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pressure::{DEFAULT_PRESSURE_DBAR, SENSOR_DEPTH_M};

/// Angular unit of the `latitude` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LatitudeUnit {
    /// Degrees, converted to radians before `sin`.
    #[default]
    Degrees,
    /// Radians, passed to `sin` unchanged.
    Radians,
}

impl LatitudeUnit {
    pub fn to_radians(self, latitude: f64) -> f64 {
        match self {
            LatitudeUnit::Degrees => latitude.to_radians(),
            LatitudeUnit::Radians => latitude,
        }
    }
}

/// What the batch layer does when a single row cannot be converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    #[default]
    FailFast,
    /// Log the failure and leave the row's salinity cell empty.
    SkipAndLog,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub sensor_depth_m: f64,
    /// Used for every row when the table carries no latitude column.
    pub default_pressure_dbar: f64,
    pub latitude_unit: LatitudeUnit,
    pub on_row_error: RowErrorPolicy,
    pub solver_tolerance_dbar: f64,
    pub solver_max_iterations: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            sensor_depth_m: SENSOR_DEPTH_M,
            default_pressure_dbar: DEFAULT_PRESSURE_DBAR,
            latitude_unit: LatitudeUnit::Degrees,
            on_row_error: RowErrorPolicy::FailFast,
            solver_tolerance_dbar: 1e-12,
            solver_max_iterations: 100,
        }
    }
}

impl ConversionOptions {
    /// Reject settings no physical sensor can have.
    pub fn validate(&self) -> Result<(), AppError> {
        let non_negative = [
            ("sensor_depth_m", self.sensor_depth_m),
            ("default_pressure_dbar", self.default_pressure_dbar),
            ("solver_tolerance_dbar", self.solver_tolerance_dbar),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidOptions {
                    field,
                    reason: format!("must be a finite, non-negative number, got {value}"),
                });
            }
        }
        if self.solver_max_iterations == 0 {
            return Err(AppError::InvalidOptions {
                field: "solver_max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// One sensor sample: conductivity in mS/cm, temperature in °C.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    pub conductivity: f64,
    pub temperature: f64,
    pub latitude: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SalinityResult {
    pub reading: SensorReading,
    pub pressure_dbar: f64,
    /// Practical salinity (PSU).
    pub salinity: f64,
}

/// Summary of one batch conversion, printed by the CLI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub rows_written: usize,
    pub rows_converted: usize,
    pub rows_skipped: usize,
    pub used_default_pressure: bool,
}
