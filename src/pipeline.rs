use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::parser::{parse_srv_file, ElevationPolicy};
use crate::transform::{UtmTransformer, DEFAULT_EPSG};
use crate::writer::GpxWriter;

pub const DEFAULT_CREATOR: &str = "srv2gpx";

/// Everything one conversion run needs.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Content of the document `<name>` element.
    pub title: String,
    /// `creator` attribute of the root element.
    pub creator: String,
    /// Projected reference system of the fix coordinates.
    pub epsg: u32,
    pub elevation: ElevationPolicy,
}

impl ConvertConfig {
    /// Defaults: title from the input file stem, EPSG:2153, elevations passed through.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let title = default_title(&input);

        Self {
            input,
            output: output.into(),
            title,
            creator: DEFAULT_CREATOR.to_string(),
            epsg: DEFAULT_EPSG,
            elevation: ElevationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub waypoints: usize,
    pub output: PathBuf,
}

/// Runs parse, reprojection and GPX output for one input file.
///
/// The output file is only created once every record has been parsed and
/// projected.
pub fn convert(config: &ConvertConfig) -> Result<ConvertSummary> {
    let transformer = UtmTransformer::from_epsg(config.epsg)?;

    let records = parse_srv_file(&config.input, config.elevation)?;
    info!(
        "Parsed {} fix records from {:?}",
        records.len(),
        config.input
    );

    let waypoints = transformer.to_waypoints(records)?;
    info!(
        "Projected {} waypoints from EPSG:{}",
        waypoints.len(),
        transformer.epsg()
    );

    let writer = GpxWriter::new(config.title.as_str(), config.creator.as_str());
    writer.write(&waypoints, &config.output)?;

    Ok(ConvertSummary {
        waypoints: waypoints.len(),
        output: config.output.clone(),
    })
}

/// `<input>.gpx` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("gpx")
}

fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Waypoints")
        .to_string()
}
