use anyhow::{Context, Result};
use clap::Parser;
use srv2gpx::pipeline::{convert, default_output_path, ConvertConfig, DEFAULT_CREATOR};
use srv2gpx::transform::DEFAULT_EPSG;
use srv2gpx::ElevationPolicy;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Survey file containing #fix records
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output GPX file (default: INPUT with a .gpx extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Document name written to <name> (default: input file stem)
    #[arg(short, long)]
    title: Option<String>,

    /// creator attribute of the GPX root element
    #[arg(short, long, default_value = DEFAULT_CREATOR)]
    creator: String,

    /// EPSG code of the projected coordinates in the input
    #[arg(short, long, default_value_t = DEFAULT_EPSG)]
    epsg: u32,

    /// Reject fix records whose elevation is not a number
    #[arg(long)]
    numeric_elevation: bool,
}

impl Args {
    fn into_config(self) -> ConvertConfig {
        let output = self
            .output
            .unwrap_or_else(|| default_output_path(&self.input));
        let mut config = ConvertConfig::new(self.input, output);

        if let Some(title) = self.title {
            config.title = title;
        }
        config.creator = self.creator;
        config.epsg = self.epsg;
        if self.numeric_elevation {
            config.elevation = ElevationPolicy::Numeric;
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    let config = args.into_config();
    info!(
        "Converting {:?} -> {:?} (EPSG:{})",
        config.input, config.output, config.epsg
    );

    let summary = convert(&config)
        .inspect_err(|e| error!("Conversion failed: {}", e))
        .with_context(|| format!("Failed to convert {}", config.input.display()))?;

    info!(
        "Written {} waypoints to {:?}",
        summary.waypoints, summary.output
    );
    info!("Total processing time: {:?}", start_time.elapsed());

    Ok(())
}
