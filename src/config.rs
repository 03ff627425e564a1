//! Run configuration
//!
//! A run is a filter selection plus pipeline settings. Both can be loaded
//! from a JSON file; command-line flags override whatever the file sets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::{FilterTopology, StereoFilter};
use crate::error::{FilterError, Result};

/// Frames per processing block
pub const DEFAULT_BLOCK_FRAMES: usize = 512;

/// Filter selection and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub topology: FilterTopology,
    /// Centre or cutoff frequency in Hz
    pub frequency: f64,
    /// Bandwidth in Hz (band topologies only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
}

impl FilterSpec {
    pub fn new(topology: FilterTopology, frequency: f64, bandwidth: Option<f64>) -> Self {
        Self {
            topology,
            frequency,
            bandwidth,
        }
    }

    /// Design a zeroed filter for a stream at `sample_rate`
    pub fn build(&self, sample_rate: f64) -> Result<StereoFilter> {
        StereoFilter::design(self.topology, sample_rate, self.frequency, self.bandwidth)
    }
}

/// Block pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stereo frames read, filtered and written per iteration
    pub block_frames: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_frames: DEFAULT_BLOCK_FRAMES,
        }
    }
}

impl PipelineConfig {
    pub fn with_block_frames(block_frames: usize) -> Self {
        Self { block_frames }
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_frames == 0 {
            return Err(FilterError::invalid_parameter(
                "block_frames",
                self.block_frames,
                "at least 1 frame per block",
            ));
        }
        Ok(())
    }
}

/// Everything a filtering run needs besides the file paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub filter: Option<FilterSpec>,
    pub pipeline: PipelineConfig,
}

impl RunConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
