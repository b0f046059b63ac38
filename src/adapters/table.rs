//! CSV table adapter: read sensor records, convert each row, write the
//! augmented table beside the input.
//!
//! The whole output is rendered in memory before anything touches the
//! filesystem, so a failed conversion leaves no output file behind.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::error::{AppError, ConversionError};
use crate::models::{ConversionOptions, ConversionReport, RowErrorPolicy, SensorReading};
use crate::pressure::PressureEstimator;
use crate::salinity::calculator::{SalinityConverter, VALID_TEMPERATURE_C};

pub const CONDUCTIVITY_COLUMN: &str = "conductivity";
pub const TEMPERATURE_COLUMN: &str = "temperature";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const SALINITY_COLUMN: &str = "salinity_convert";
pub const OUTPUT_SUFFIX: &str = "_salinity_converted.csv";

/// A header row plus data records, fields kept as read.
#[derive(Clone, Debug)]
pub struct SensorTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl SensorTable {
    pub fn read(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|source| AppError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    /// `path` is only used in error messages.
    pub fn from_reader<R: Read>(rdr: R, path: &Path) -> Result<Self, AppError> {
        let parse_err = |source: csv::Error| AppError::ParseCsv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);
        let headers = reader.headers().map_err(parse_err)?.clone();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(parse_err)?;

        Ok(Self { headers, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Input table plus one salinity value per row (`None` for skipped rows).
#[derive(Clone, Debug)]
pub struct ConvertedTable {
    pub table: SensorTable,
    pub salinity: Vec<Option<f64>>,
}

impl ConvertedTable {
    pub fn skipped(&self) -> usize {
        self.salinity.iter().filter(|s| s.is_none()).count()
    }

    /// Render as CSV: leading unnamed row-index column, original columns,
    /// then `salinity_convert`. An existing `salinity_convert` column is
    /// overwritten in place rather than duplicated.
    pub fn to_csv(&self) -> Result<Vec<u8>, AppError> {
        let render_err = |source: csv::Error| AppError::RenderCsv { source };
        let existing = self.table.column(SALINITY_COLUMN);

        let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());

        let mut header = StringRecord::new();
        header.push_field("");
        header.extend(self.table.headers.iter());
        if existing.is_none() {
            header.push_field(SALINITY_COLUMN);
        }
        wtr.write_record(&header).map_err(render_err)?;

        for (index, (record, salinity)) in
            self.table.records.iter().zip(&self.salinity).enumerate()
        {
            let value = salinity.map(|s| s.to_string()).unwrap_or_default();
            let mut row = StringRecord::new();
            row.push_field(&index.to_string());
            for (i, field) in record.iter().enumerate() {
                if Some(i) == existing {
                    row.push_field(&value);
                } else {
                    row.push_field(field);
                }
            }
            if existing.is_none() {
                row.push_field(&value);
            }
            wtr.write_record(&row).map_err(render_err)?;
        }

        wtr.into_inner()
            .map_err(|e| render_err(csv::Error::from(e.into_error())))
    }
}

struct Columns {
    conductivity: usize,
    temperature: usize,
    latitude: Option<usize>,
}

impl Columns {
    fn locate(table: &SensorTable, path: &Path) -> Result<Self, AppError> {
        let require = |column: &'static str| {
            table.column(column).ok_or_else(|| AppError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
        };
        Ok(Self {
            conductivity: require(CONDUCTIVITY_COLUMN)?,
            temperature: require(TEMPERATURE_COLUMN)?,
            latitude: table.column(LATITUDE_COLUMN),
        })
    }

    fn reading(&self, record: &StringRecord) -> Result<SensorReading, ConversionError> {
        Ok(SensorReading {
            conductivity: parse_field(record, self.conductivity, CONDUCTIVITY_COLUMN)?,
            temperature: parse_field(record, self.temperature, TEMPERATURE_COLUMN)?,
            latitude: match self.latitude {
                Some(i) => parse_field(record, i, LATITUDE_COLUMN)?,
                None => f64::NAN,
            },
        })
    }
}

fn parse_field(
    record: &StringRecord,
    index: usize,
    column: &'static str,
) -> Result<f64, ConversionError> {
    let raw = record.get(index).map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ConversionError::invalid(column, "missing value"));
    }
    raw.parse::<f64>()
        .map_err(|_| ConversionError::invalid(column, format!("cannot parse '{raw}' as a number")))
}

/// Convert every row of `table`. `path` is only used in error messages.
pub fn convert_table(
    table: &SensorTable,
    options: &ConversionOptions,
    path: &Path,
) -> Result<ConvertedTable, AppError> {
    options.validate()?;
    let columns = Columns::locate(table, path)?;

    let converter = if columns.latitude.is_some() {
        SalinityConverter::new(PressureEstimator::from_options(options))
    } else {
        warn!(
            path = %path.display(),
            pressure_dbar = options.default_pressure_dbar,
            "no '{LATITUDE_COLUMN}' column, using default pressure for every row"
        );
        SalinityConverter::without_latitude(options.default_pressure_dbar)
    };

    let (t_min, t_max) = VALID_TEMPERATURE_C;
    let mut out_of_range = 0usize;
    let mut salinity = Vec::with_capacity(table.len());

    for (index, record) in table.records.iter().enumerate() {
        let result = columns
            .reading(record)
            .and_then(|reading| converter.convert(&reading));

        match result {
            Ok(converted) => {
                let t = converted.reading.temperature;
                if t < t_min || t > t_max {
                    out_of_range += 1;
                }
                salinity.push(Some(converted.salinity));
            }
            Err(source) => match options.on_row_error {
                RowErrorPolicy::FailFast => return Err(AppError::Row { index, source }),
                RowErrorPolicy::SkipAndLog => {
                    warn!(row = index, error = %source, "skipping row");
                    salinity.push(None);
                }
            },
        }
    }

    if out_of_range > 0 {
        warn!(
            rows = out_of_range,
            "temperature outside {t_min}..={t_max} °C, PSS-78 accuracy degrades"
        );
    }

    Ok(ConvertedTable {
        table: table.clone(),
        salinity,
    })
}

/// `<dir>/<stem>_salinity_converted.csv` for an input `<dir>/<stem>.<ext>`.
pub fn output_path_for(input: &Path) -> Result<PathBuf, AppError> {
    let stem = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::NoFileName {
            path: input.to_path_buf(),
        })?;
    let mut name = stem.to_os_string();
    name.push(OUTPUT_SUFFIX);
    Ok(input.with_file_name(name))
}

/// Read `path`, convert with default options, write the output table.
pub fn convert_file(path: impl AsRef<Path>) -> Result<ConversionReport, AppError> {
    convert_file_with(path, &ConversionOptions::default())
}

pub fn convert_file_with(
    path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionReport, AppError> {
    let path = path.as_ref();
    let output_path = output_path_for(path)?;

    let table = SensorTable::read(path)?;
    info!(path = %path.display(), rows = table.len(), "read sensor table");

    let converted = convert_table(&table, options, path)?;
    let bytes = converted.to_csv()?;

    fs::write(&output_path, bytes).map_err(|source| AppError::WriteFile {
        path: output_path.clone(),
        source,
    })?;

    let rows_skipped = converted.skipped();
    let report = ConversionReport {
        output_path,
        rows_written: table.len(),
        rows_converted: table.len() - rows_skipped,
        rows_skipped,
        used_default_pressure: table.column(LATITUDE_COLUMN).is_none(),
    };
    info!(
        output = %report.output_path.display(),
        converted = report.rows_converted,
        skipped = report.rows_skipped,
        "wrote converted table"
    );
    debug!(?options, "conversion options");
    Ok(report)
}
