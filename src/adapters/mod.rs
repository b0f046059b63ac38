#[cfg(feature = "cli")]
pub mod cli;
pub mod table;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, init_logging, parse_options};
    use crate::adapters::table::convert_file_with;

    let args = Args::parse();
    init_logging(&args);
    let options = parse_options(&args)?;

    let report = convert_file_with(&args.input, &options)?;

    crate::adapters::cli::print_output(&report, &args)?;

    Ok(())
}
