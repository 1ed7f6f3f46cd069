#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use cld_dispatch::{cli, config::Config, setup_logging};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = cli::parse_args();

    // Setup logging based on debug flag
    setup_logging(args.debug)?;

    // Initialize configuration
    let config = Config::from_args(&args)?;

    // Dispatch and exit with the numeric status code
    let status = cli::execute_command(&config, &args.tokens)?;
    Ok(ExitCode::from(u8::try_from(status.code()).unwrap_or(1)))
}
