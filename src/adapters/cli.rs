use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::AppError;
use crate::models::{ConversionOptions, ConversionReport, LatitudeUnit, RowErrorPolicy};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert conductivity readings in a CSV table to PSS-78 practical salinity",
    long_about = None
)]
pub struct Args {
    #[arg(
        value_name = "INPUT",
        help = "CSV with conductivity, temperature and latitude columns"
    )]
    pub input: PathBuf,
    #[arg(long, help = "Print the conversion report as JSON")]
    json: bool,
    #[arg(long, help = "Log and skip rows that cannot be converted instead of failing")]
    skip_invalid: bool,
    #[arg(long, value_enum, value_name = "UNIT", help = "Angular unit of the latitude column")]
    latitude_unit: Option<LatitudeUnit>,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON file with conversion options; '-' reads from stdin"
    )]
    options: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Inline JSON for conversion options (overrides --options)"
    )]
    options_json: Option<String>,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "More log output (-v info, -vv debug, -vvv trace)"
    )]
    verbose: u8,
    #[arg(short, long, conflicts_with = "verbose", help = "Only log errors")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Install a stderr `tracing` subscriber. `RUST_LOG` takes precedence.
pub fn init_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("salinity_convert={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn parse_options_json(doc: &str) -> Result<ConversionOptions, AppError> {
    serde_json::from_str(doc).map_err(|source| AppError::ParseOptionsJson { source })
}

pub fn parse_options(args: &Args) -> Result<ConversionOptions, AppError> {
    let mut options = match (&args.options_json, &args.options) {
        (Some(doc), _) => parse_options_json(doc)?,
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadOptions {
                    path: path.clone(),
                    source,
                })?;
            parse_options_json(&s)?
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadOptions {
                path: path.clone(),
                source,
            })?;
            parse_options_json(&s)?
        }
        (None, None) => ConversionOptions::default(),
    };

    if args.skip_invalid {
        options.on_row_error = RowErrorPolicy::SkipAndLog;
    }
    if let Some(unit) = args.latitude_unit {
        options.latitude_unit = unit;
    }

    Ok(options)
}

pub fn print_output(report: &ConversionReport, args: &Args) -> Result<(), AppError> {
    if args.json {
        let s = serde_json::to_string_pretty(report)
            .map_err(|source| AppError::SerializeOutput { source })?;
        println!("{}", s);
    } else {
        println!(
            "Conductivity successfully converted to salinity and file saved to: {}",
            report.output_path.display()
        );
        if report.rows_skipped > 0 {
            println!(
                "Skipped {} of {} rows",
                report.rows_skipped, report.rows_written
            );
        }
    }

    Ok(())
}
