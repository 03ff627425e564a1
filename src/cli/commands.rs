//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;

use crate::config::{FilterSpec, PipelineConfig, RunConfig};
use crate::dsp::{CoefficientSet, FilterTopology};
use crate::engine::{filter_file, probe, FileReport};
use crate::error::{FilterError, Result};

/// Command-line values for `apply`, before merging with a config file
#[derive(Debug, Clone, Default)]
pub struct ApplyArgs {
    pub filter: Option<FilterTopology>,
    pub frequency: Option<f64>,
    pub bandwidth: Option<f64>,
    pub block_frames: Option<usize>,
}

/// Merge flags over an optional config file
pub fn resolve_run(
    args: &ApplyArgs,
    config_path: Option<&Path>,
) -> Result<(FilterSpec, PipelineConfig)> {
    let config = match config_path {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            RunConfig::load(path)?
        }
        None => RunConfig::default(),
    };
    let from_file = config.filter.as_ref();

    let topology = args
        .filter
        .or_else(|| from_file.map(|f| f.topology))
        .ok_or_else(|| FilterError::invalid_parameter("filter", "none", "a filter name or index"))?;
    let frequency = args
        .frequency
        .or_else(|| from_file.map(|f| f.frequency))
        .ok_or_else(|| FilterError::invalid_parameter("frequency", "none", "a frequency in Hz"))?;
    let bandwidth = args.bandwidth.or_else(|| from_file.and_then(|f| f.bandwidth));

    let mut pipeline = config.pipeline;
    if let Some(block_frames) = args.block_frames {
        pipeline.block_frames = block_frames;
    }

    Ok((FilterSpec::new(topology, frequency, bandwidth), pipeline))
}

/// Filter a WAV file.
pub fn apply(
    input: &Path,
    output: &Path,
    args: &ApplyArgs,
    config_path: Option<&Path>,
) -> Result<FileReport> {
    let (spec, pipeline) = resolve_run(args, config_path)?;
    println!("{}:", spec.topology.display_name());

    let report = filter_file(input, output, &spec, &pipeline)?;

    println!("\n Filter coefficients:\n{}", report.coefficients);
    println!("\nDone. {} sample frames copied", report.frames);

    Ok(report)
}

/// Report the format of a WAV file.
pub fn info(path: &Path) -> Result<()> {
    info!("Inspecting: {}", path.display());

    let audio = probe(path)?;
    let props = audio.properties;

    println!("Sample rate: {}", props.sample_rate);
    println!("Channels: {}", props.channels);
    println!("Info: infile is in {} format.", props.encoding.description());
    println!("Length: {} frames ({:.3}s)", audio.frames, audio.duration_secs());

    Ok(())
}

/// Print the coefficients for a filter design.
pub fn coefficients(
    topology: FilterTopology,
    sample_rate: f64,
    frequency: f64,
    bandwidth: Option<f64>,
) -> Result<CoefficientSet> {
    let set = CoefficientSet::design(topology, sample_rate, frequency, bandwidth)?;

    println!("{} at {} Hz:", topology.display_name(), sample_rate);
    println!("\n Filter coefficients:\n{}", set);
    if topology.is_suspect() {
        println!("\nNote: these coefficients are known to give poor results");
    }

    Ok(set)
}

/// List the available filters.
pub fn list() {
    println!("{:<6}{:<26}{}", "Index", "Name", "Parameters");
    println!("{:-<60}", "");
    for topology in FilterTopology::ALL {
        println!(
            "{:<6}{:<26}{}",
            topology.index(),
            topology.name(),
            topology.required_parameters().join(", ")
        );
    }
}
