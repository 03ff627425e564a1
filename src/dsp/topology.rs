//! Filter topology selection
//!
//! Six second-order topologies, selectable by name or by index.

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter topology for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTopology {
    /// Two-pole resonator with gain normalization
    Resonator,
    /// Resonator with a zero at z = r (direct form II)
    BandPassResonator,
    /// Butterworth low-pass
    ButterworthLowPass,
    /// Butterworth high-pass
    ButterworthHighPass,
    /// Butterworth band-pass
    ButterworthBandPass,
    /// Butterworth band-reject
    ButterworthBandReject,
}

impl FilterTopology {
    /// All topologies, in index order
    pub const ALL: [FilterTopology; 6] = [
        FilterTopology::Resonator,
        FilterTopology::BandPassResonator,
        FilterTopology::ButterworthLowPass,
        FilterTopology::ButterworthHighPass,
        FilterTopology::ButterworthBandPass,
        FilterTopology::ButterworthBandReject,
    ];

    /// Selection index (0-5)
    pub fn index(self) -> usize {
        match self {
            FilterTopology::Resonator => 0,
            FilterTopology::BandPassResonator => 1,
            FilterTopology::ButterworthLowPass => 2,
            FilterTopology::ButterworthHighPass => 3,
            FilterTopology::ButterworthBandPass => 4,
            FilterTopology::ButterworthBandReject => 5,
        }
    }

    /// Look up a topology by selection index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical name, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            FilterTopology::Resonator => "resonator",
            FilterTopology::BandPassResonator => "band_pass_resonator",
            FilterTopology::ButterworthLowPass => "butterworth_low_pass",
            FilterTopology::ButterworthHighPass => "butterworth_high_pass",
            FilterTopology::ButterworthBandPass => "butterworth_band_pass",
            FilterTopology::ButterworthBandReject => "butterworth_band_reject",
        }
    }

    /// Short alias
    fn alias(self) -> &'static str {
        match self {
            FilterTopology::Resonator => "reson",
            FilterTopology::BandPassResonator => "bpreson",
            FilterTopology::ButterworthLowPass => "lp",
            FilterTopology::ButterworthHighPass => "hp",
            FilterTopology::ButterworthBandPass => "bp",
            FilterTopology::ButterworthBandReject => "br",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            FilterTopology::Resonator => "Resonator",
            FilterTopology::BandPassResonator => "Band Pass Resonator",
            FilterTopology::ButterworthLowPass => "Butterworth low pass",
            FilterTopology::ButterworthHighPass => "Butterworth high pass",
            FilterTopology::ButterworthBandPass => "Butterworth band pass",
            FilterTopology::ButterworthBandReject => "Butterworth band reject",
        }
    }

    /// Whether the topology needs a bandwidth in addition to the frequency
    pub fn requires_bandwidth(self) -> bool {
        !matches!(
            self,
            FilterTopology::ButterworthLowPass | FilterTopology::ButterworthHighPass
        )
    }

    /// Whether the topology uses direct-form (Butterworth) coefficients
    pub fn is_direct_form(self) -> bool {
        matches!(
            self,
            FilterTopology::ButterworthLowPass
                | FilterTopology::ButterworthHighPass
                | FilterTopology::ButterworthBandPass
                | FilterTopology::ButterworthBandReject
        )
    }

    /// High-pass and band-reject coefficients are known to misbehave.
    ///
    /// The formulas are kept as documented; callers are warned instead.
    pub fn is_suspect(self) -> bool {
        matches!(
            self,
            FilterTopology::ButterworthHighPass | FilterTopology::ButterworthBandReject
        )
    }

    /// Names of the parameters the topology requires
    pub fn required_parameters(self) -> &'static [&'static str] {
        if self.requires_bandwidth() {
            &["frequency", "bandwidth"]
        } else {
            &["frequency"]
        }
    }
}

impl fmt::Display for FilterTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterTopology {
    type Err = FilterError;

    /// Accepts an index, the canonical name, a kebab-case name or a short alias
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");

        if let Ok(index) = key.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| FilterError::UnknownTopology { name: s.to_string() });
        }

        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == key || t.alias() == key)
            .ok_or_else(|| FilterError::UnknownTopology { name: s.to_string() })
    }
}
