//! CLI Module
//!
//! Command-line interface for the filter bank.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::FilterTopology;

/// Stereo filter bank - resonators and Butterworth filters for WAV files
#[derive(Parser, Debug)]
#[command(name = "filterbank")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter a stereo WAV file
    #[command(name = "apply")]
    Apply {
        /// Filter name or index (see `list`); may come from --config instead
        #[arg(value_parser = parse_topology)]
        filter: Option<FilterTopology>,

        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file (same format as the input)
        #[arg(short, long)]
        output: PathBuf,

        /// Centre or cutoff frequency in Hz
        #[arg(short, long)]
        frequency: Option<f64>,

        /// Bandwidth in Hz (resonators, band-pass and band-reject)
        #[arg(short, long)]
        bandwidth: Option<f64>,

        /// Frames per processing block
        #[arg(long)]
        block_frames: Option<usize>,

        /// JSON run configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Report the sample rate, channels and format of a WAV file
    #[command(name = "info")]
    Info {
        /// WAV file to inspect
        path: PathBuf,
    },

    /// Print the coefficients a filter would use
    #[command(name = "coefficients")]
    Coefficients {
        /// Filter name or index
        #[arg(value_parser = parse_topology)]
        filter: FilterTopology,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100.0)]
        sample_rate: f64,

        /// Centre or cutoff frequency in Hz
        #[arg(short, long)]
        frequency: f64,

        /// Bandwidth in Hz
        #[arg(short, long)]
        bandwidth: Option<f64>,
    },

    /// List the available filters
    #[command(name = "list")]
    List,
}

fn parse_topology(s: &str) -> std::result::Result<FilterTopology, String> {
    s.parse().map_err(|e: crate::FilterError| e.to_string())
}
