//! Concatenates the SDI rows of the GBD mortality exports into one CSV.

use std::path::PathBuf;

use cardio_pipeline::logging::init_logging;
use cardio_pipeline::mortality::{load_mortality, write_mortality};
use cardio_pipeline::PipelineConfig;
use clap::{ArgAction, Parser};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AggregateArgs {
    #[arg(short, long, help = "JSON config file; built-in paths are used when absent")]
    config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, help = "Verbose level")]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = AggregateArgs::parse();
    init_logging(args.verbose);

    let config = PipelineConfig::load(args.config.as_deref())?;
    let rates = load_mortality(&config.mortality_sources)?;
    write_mortality(&config.mortality_output, &rates)?;

    info!(
        "{} rows from {} files written to {:?}",
        rates.len(),
        config.mortality_sources.len(),
        config.mortality_output
    );
    Ok(())
}
