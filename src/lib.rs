pub mod adapters;
pub mod error;
pub mod models;
pub mod pressure;
pub mod salinity;

pub use crate::adapters::table::{convert_file, convert_file_with, output_path_for};
pub use crate::error::{AppError, ConversionError};
pub use crate::models::{
    ConversionOptions, ConversionReport, LatitudeUnit, RowErrorPolicy, SalinityResult,
    SensorReading,
};
pub use crate::pressure::{PressureEstimator, depth_from_pressure, normal_gravity};
pub use crate::salinity::calculator::{
    SalinityConverter, SalinityTerms, practical_salinity, practical_salinity_detailed,
};
