use std::fs;

use salinity_convert::{
    AppError, ConversionOptions, ConversionError, LatitudeUnit, convert_file, convert_file_with,
    practical_salinity,
};
use tempfile::tempdir;

const INPUT: &str = "\
station,conductivity,temperature,latitude,depth_note
A1,43.0,33.0,30.134,surface
A2,30.5,12.25,29.9,surface
A3,52.1,24.0,31.2,
A4,0.8,18.0,30.0,estuary
";

fn read_output(path: &std::path::Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let rows = rdr.records().map(Result::unwrap).collect();
    (headers, rows)
}

#[test]
fn converted_file_keeps_rows_and_columns() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("survey_june.csv");
    fs::write(&input, INPUT).unwrap();

    let report = convert_file(&input).unwrap();
    assert_eq!(
        report.output_path,
        dir.path().join("survey_june_salinity_converted.csv")
    );
    assert_eq!(report.rows_written, 4);
    assert_eq!(report.rows_converted, 4);
    assert_eq!(report.rows_skipped, 0);
    assert!(!report.used_default_pressure);

    let (headers, rows) = read_output(&report.output_path);
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "",
            "station",
            "conductivity",
            "temperature",
            "latitude",
            "depth_note",
            "salinity_convert"
        ]
    );
    assert_eq!(rows.len(), 4);

    for (i, row) in rows.iter().enumerate() {
        assert_eq!(&row[0], i.to_string().as_str());
        let salinity = &row[6];
        assert!(!salinity.is_empty(), "row {i} has no salinity");
        salinity.parse::<f64>().unwrap();
    }
    assert_eq!(&rows[0][1], "A1");
    assert_eq!(&rows[2][5], "");
    assert_eq!(&rows[3][5], "estuary");

    let first: f64 = rows[0][6].parse().unwrap();
    assert!((first - 23.418_64).abs() < 1e-4, "first = {first}");
}

#[test]
fn existing_output_is_overwritten() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("survey.csv");
    fs::write(&input, INPUT).unwrap();
    let output = dir.path().join("survey_salinity_converted.csv");
    fs::write(&output, "stale").unwrap();

    convert_file(&input).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with(",station,"));
}

#[test]
fn failed_row_writes_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.csv");
    fs::write(
        &input,
        "conductivity,temperature,latitude\n43,33,30\n43,33,north\n",
    )
    .unwrap();

    let err = convert_file(&input).unwrap_err();
    match &err {
        AppError::Row { index, .. } => assert_eq!(*index, 1),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        err.conversion(),
        Some(ConversionError::InvalidInput {
            field: "latitude",
            ..
        })
    ));
    assert!(!dir.path().join("broken_salinity_converted.csv").exists());
}

#[test]
fn missing_input_is_a_read_error() {
    let dir = tempdir().unwrap();
    let err = convert_file(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, AppError::ReadFile { .. }));
}

#[test]
fn table_without_latitude_uses_default_pressure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("nolat.csv");
    fs::write(&input, "conductivity,temperature\n43,33\n").unwrap();

    let report = convert_file(&input).unwrap();
    assert!(report.used_default_pressure);

    let (_, rows) = read_output(&report.output_path);
    let salinity: f64 = rows[0][3].parse().unwrap();
    assert_eq!(salinity, practical_salinity(43.0, 33.0, 0.257).unwrap());
}

#[test]
fn radians_option_changes_derived_pressure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("legacy.csv");
    fs::write(&input, "conductivity,temperature,latitude\n43,33,30.134\n").unwrap();

    let options = ConversionOptions {
        latitude_unit: LatitudeUnit::Radians,
        ..Default::default()
    };
    let report = convert_file_with(&input, &options).unwrap();
    let (_, rows) = read_output(&report.output_path);
    let radians: f64 = rows[0][4].parse().unwrap();

    let report = convert_file(&input).unwrap();
    let (_, rows) = read_output(&report.output_path);
    let degrees: f64 = rows[0][4].parse().unwrap();

    assert_ne!(radians, degrees);
    assert!((radians - degrees).abs() < 1e-4);
}

#[test]
fn negative_sensor_depth_option_is_rejected_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("deep.csv");
    fs::write(&input, "conductivity,temperature,latitude\n43,33,30\n").unwrap();

    let options = ConversionOptions {
        sensor_depth_m: -1.0,
        ..Default::default()
    };
    let err = convert_file_with(&input, &options).unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidOptions {
            field: "sensor_depth_m",
            ..
        }
    ));
    assert!(!dir.path().join("deep_salinity_converted.csv").exists());
}
