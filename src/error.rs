use std::path::PathBuf;

use thiserror::Error;

use crate::pressure::solver::SolverError;

/// Failure of a single scalar conversion (one reading).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(
        "Pressure inversion failed for latitude {latitude} in bracket [{}, {}] dbar: {source}",
        .bracket.0,
        .bracket.1
    )]
    PressureInversion {
        latitude: f64,
        bracket: (f64, f64),
        #[source]
        source: SolverError,
    },
}

impl ConversionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error reading file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in '{}': {source}", .path.display())]
    ParseCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in '{}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Row {index}: {source}")]
    Row {
        index: usize,
        #[source]
        source: ConversionError,
    },

    #[error("Error writing file '{}': {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not render output table: {source}")]
    RenderCsv {
        #[source]
        source: csv::Error,
    },

    #[error("Invalid conversion option '{field}': {reason}")]
    InvalidOptions { field: &'static str, reason: String },

    #[error("Input path '{}' has no file name", .path.display())]
    NoFileName { path: PathBuf },

    #[cfg(feature = "cli")]
    #[error("Error reading options file '{path}': {source}")]
    ReadOptions {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for conversion options: {source}")]
    ParseOptionsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Could not serialize report to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// The underlying per-reading failure, when the batch failed on a row.
    pub fn conversion(&self) -> Option<&ConversionError> {
        match self {
            AppError::Row { source, .. } => Some(source),
            _ => None,
        }
    }
}
