use std::path::PathBuf;

use cardio_pipeline::logging::init_logging;
use cardio_pipeline::{Pipeline, PipelineConfig};
use clap::{ArgAction, Parser};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct PipelineArgs {
    #[arg(short, long, help = "JSON config file; built-in paths are used when absent")]
    config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, help = "Verbose level")]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = PipelineArgs::parse();
    init_logging(args.verbose);
    debug!("Arguments {:#?}", args);

    let config = PipelineConfig::load(args.config.as_deref())?;
    let output = Pipeline::new(config).run()?;

    info!("{}", output.long.head(Some(5)));
    println!("{}", serde_json::to_string_pretty(&output.report)?);

    Ok(())
}
