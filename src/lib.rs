//! filterbank - Streaming Stereo Filter Bank
//!
//! Second-order recursive filters applied block by block to interleaved
//! stereo audio:
//! - Resonator and band-pass resonator
//! - Butterworth low-pass, high-pass, band-pass and band-reject
//!
//! # Architecture
//!
//! - `dsp`: coefficient design, per-channel history, and the stream filter
//! - `engine`: block pipeline over frame sources and sinks (WAV or memory)
//! - `config`: filter selection and pipeline settings
//!
//! ```no_run
//! use filterbank::config::{FilterSpec, PipelineConfig};
//! use filterbank::dsp::FilterTopology;
//! use filterbank::engine::filter_file;
//! use std::path::Path;
//!
//! let spec = FilterSpec::new(FilterTopology::ButterworthLowPass, 1000.0, None);
//! let report = filter_file(
//!     Path::new("in.wav"),
//!     Path::new("out.wav"),
//!     &spec,
//!     &PipelineConfig::default(),
//! )?;
//! println!("{} frames", report.frames);
//! # Ok::<(), filterbank::FilterError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

pub use error::{FilterError, Result};
