//! Coefficient design for the six topologies
//!
//! Pure functions from (sample rate, frequency[, bandwidth]) to recursion
//! coefficients. Nothing is clamped: out-of-domain parameters are rejected
//! with `InvalidParameter` before any arithmetic.
//!
//! Butterworth coefficients follow the table in Lazzarini, "Audio Programming",
//! p. 484; the difference equation is
//! `y(n) = a0*x(n) + a1*x(n-1) + a2*x(n-2) - b1*y(n-1) - b2*y(n-2)`.

use super::FilterTopology;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Direct-form biquad coefficients (Butterworth topologies)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectFormCoefficients {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub b1: f64,
    pub b2: f64,
    /// Warped cutoff term λ the coefficients were derived from
    pub lambda: f64,
    /// Centre-frequency term φ = 2cos(2πf/sr) (band topologies only)
    pub phi: Option<f64>,
}

/// Derived scalars for the two resonator topologies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonatorCoefficients {
    /// Pole radius
    pub r: f64,
    pub r_squared: f64,
    /// Feedback gain on y[n-1]: 2r·cosθ
    pub two_r_cos_theta: f64,
    pub cos_theta: f64,
    /// Input gain
    pub scale: f64,
}

/// Coefficients produced for one topology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum CoefficientSet {
    DirectForm(DirectFormCoefficients),
    Resonator(ResonatorCoefficients),
}

impl CoefficientSet {
    /// Design the coefficients for `topology`
    ///
    /// `bandwidth` is required by every topology except the Butterworth
    /// low-pass and high-pass, which ignore it.
    pub fn design(
        topology: FilterTopology,
        sample_rate: f64,
        frequency: f64,
        bandwidth: Option<f64>,
    ) -> Result<Self> {
        let bw = || {
            bandwidth.ok_or_else(|| {
                FilterError::invalid_parameter(
                    "bandwidth",
                    "none",
                    format!("a bandwidth for {}", topology.display_name()),
                )
            })
        };

        let set = match topology {
            FilterTopology::Resonator => {
                CoefficientSet::Resonator(resonator(sample_rate, frequency, bw()?)?)
            }
            FilterTopology::BandPassResonator => {
                CoefficientSet::Resonator(band_pass_resonator(sample_rate, frequency, bw()?)?)
            }
            FilterTopology::ButterworthLowPass => {
                CoefficientSet::DirectForm(butterworth_low_pass(sample_rate, frequency)?)
            }
            FilterTopology::ButterworthHighPass => {
                CoefficientSet::DirectForm(butterworth_high_pass(sample_rate, frequency)?)
            }
            FilterTopology::ButterworthBandPass => {
                CoefficientSet::DirectForm(butterworth_band_pass(sample_rate, frequency, bw()?)?)
            }
            FilterTopology::ButterworthBandReject => CoefficientSet::DirectForm(
                butterworth_band_reject(sample_rate, frequency, bw()?)?,
            ),
        };

        Ok(set)
    }
}

impl fmt::Display for CoefficientSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoefficientSet::DirectForm(c) => {
                writeln!(f, " lambda = {:.6}", c.lambda)?;
                writeln!(f, " a0 = {:.6}", c.a0)?;
                writeln!(f, " a1 = {:.6}", c.a1)?;
                writeln!(f, " a2 = {:.6}", c.a2)?;
                writeln!(f, " b1 = {:.6}", c.b1)?;
                write!(f, " b2 = {:.6}", c.b2)?;
                if let Some(phi) = c.phi {
                    write!(f, "\n phi = {:.6}", phi)?;
                }
                Ok(())
            }
            CoefficientSet::Resonator(c) => {
                writeln!(f, " r = {:.6}", c.r)?;
                writeln!(f, " r^2 = {:.6}", c.r_squared)?;
                writeln!(f, " 2r*cos(theta) = {:.6}", c.two_r_cos_theta)?;
                write!(f, " scale = {:.6}", c.scale)
            }
        }
    }
}

// ============================================================================
// Parameter validation
// ============================================================================

fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(FilterError::invalid_parameter(
            "sample_rate",
            sample_rate,
            "a positive sample rate in Hz",
        ));
    }
    Ok(())
}

fn validate_frequency(sample_rate: f64, frequency: f64) -> Result<()> {
    validate_sample_rate(sample_rate)?;
    let nyquist = sample_rate / 2.0;
    if !frequency.is_finite() || frequency <= 0.0 || frequency >= nyquist {
        return Err(FilterError::invalid_parameter(
            "frequency",
            frequency,
            format!("0 < f < {} Hz", nyquist),
        ));
    }
    Ok(())
}

fn validate_bandwidth(bandwidth: f64) -> Result<()> {
    if !bandwidth.is_finite() || bandwidth <= 0.0 {
        return Err(FilterError::invalid_parameter(
            "bandwidth",
            bandwidth,
            "bw > 0 Hz",
        ));
    }
    Ok(())
}

// ============================================================================
// Resonators
// ============================================================================

/// Pole radius, squared radius and cosθ shared by both resonators
fn resonator_poles(sample_rate: f64, frequency: f64, bandwidth: f64) -> (f64, f64, f64, f64) {
    let r = 1.0 - PI * (bandwidth / sample_rate);
    let rr = 2.0 * r;
    let r_squared = r * r;
    let cos_theta = (rr / (1.0 + r_squared)) * (2.0 * PI * frequency / sample_rate).cos();
    (r, rr, r_squared, cos_theta)
}

/// Two-pole resonator, input scaled by `(1 - r²)·sin(θ)`
pub fn resonator(
    sample_rate: f64,
    frequency: f64,
    bandwidth: f64,
) -> Result<ResonatorCoefficients> {
    validate_frequency(sample_rate, frequency)?;
    validate_bandwidth(bandwidth)?;

    let (r, rr, r_squared, cos_theta) = resonator_poles(sample_rate, frequency, bandwidth);
    let scale = (1.0 - r_squared) * cos_theta.acos().sin();

    Ok(ResonatorCoefficients {
        r,
        r_squared,
        two_r_cos_theta: rr * cos_theta,
        cos_theta,
        scale,
    })
}

/// Resonator with an added zero, input scaled by `1 - r`
pub fn band_pass_resonator(
    sample_rate: f64,
    frequency: f64,
    bandwidth: f64,
) -> Result<ResonatorCoefficients> {
    validate_frequency(sample_rate, frequency)?;
    validate_bandwidth(bandwidth)?;

    let (r, rr, r_squared, cos_theta) = resonator_poles(sample_rate, frequency, bandwidth);

    Ok(ResonatorCoefficients {
        r,
        r_squared,
        two_r_cos_theta: rr * cos_theta,
        cos_theta,
        scale: 1.0 - r,
    })
}

// ============================================================================
// Butterworth
// ============================================================================

pub fn butterworth_low_pass(sample_rate: f64, frequency: f64) -> Result<DirectFormCoefficients> {
    validate_frequency(sample_rate, frequency)?;

    let l = 1.0 / (PI * frequency / sample_rate).tan();
    let a0 = 1.0 / (1.0 + 2.0 * l + l * l);

    Ok(DirectFormCoefficients {
        a0,
        a1: 2.0 * a0,
        a2: a0,
        b1: 2.0 * a0 * (1.0 - l * l),
        b2: a0 * (1.0 - 2.0 * l + l * l),
        lambda: l,
        phi: None,
    })
}

/// Butterworth high-pass. Known to misbehave with these coefficients.
pub fn butterworth_high_pass(sample_rate: f64, frequency: f64) -> Result<DirectFormCoefficients> {
    validate_frequency(sample_rate, frequency)?;

    let l = (PI * frequency / sample_rate).tan();
    let a0 = 1.0 / (1.0 + 2.0 * l + l * l);

    Ok(DirectFormCoefficients {
        a0,
        a1: 2.0 * a0,
        a2: a0,
        b1: 2.0 * a0 * (l * l - 1.0),
        b2: a0 * (1.0 - 2.0 * l + l * l),
        lambda: l,
        phi: None,
    })
}

pub fn butterworth_band_pass(
    sample_rate: f64,
    frequency: f64,
    bandwidth: f64,
) -> Result<DirectFormCoefficients> {
    validate_frequency(sample_rate, frequency)?;
    validate_bandwidth(bandwidth)?;

    let l = 1.0 / (PI * bandwidth / sample_rate).tan();
    let phi = 2.0 * (2.0 * PI * frequency / sample_rate).cos();
    let a0 = 1.0 / (1.0 + l);

    Ok(DirectFormCoefficients {
        a0,
        a1: 0.0,
        a2: -a0,
        b1: -l * phi * a0,
        b2: a0 * (l - 1.0),
        lambda: l,
        phi: Some(phi),
    })
}

/// Butterworth band-reject. Known to misbehave with these coefficients.
pub fn butterworth_band_reject(
    sample_rate: f64,
    frequency: f64,
    bandwidth: f64,
) -> Result<DirectFormCoefficients> {
    validate_frequency(sample_rate, frequency)?;
    validate_bandwidth(bandwidth)?;

    let l = (PI * bandwidth / sample_rate).tan();
    let phi = 2.0 * (2.0 * PI * frequency / sample_rate).cos();
    let a0 = 1.0 / (1.0 + l);

    Ok(DirectFormCoefficients {
        a0,
        a1: -phi * a0,
        a2: a0,
        b1: -phi * a0,
        b2: a0 * (l - 1.0),
        lambda: l,
        phi: Some(phi),
    })
}
