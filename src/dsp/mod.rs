//! Filter bank DSP
//!
//! Second-order recursive filters for interleaved stereo streams:
//! coefficient design, per-channel history, and the stream filter that ties
//! them together.

pub mod coefficients;
mod filter;
mod state;
mod topology;

pub use coefficients::{CoefficientSet, DirectFormCoefficients, ResonatorCoefficients};
pub use filter::{StereoFilter, STEREO};
pub use state::{DirectFormHistory, FeedbackHistory, StereoState};
pub use topology::FilterTopology;
