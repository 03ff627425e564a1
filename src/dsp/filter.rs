//! Stereo stream filter
//!
//! Bundles a topology with its coefficients and recursion state, so a state
//! shape can never be driven by the wrong difference equation. Processing is
//! causal and per channel; history carries across calls, which is what keeps
//! the impulse response continuous over block boundaries.
//!
//! Non-finite input samples are not sanitized and propagate through the
//! recursion.

use super::coefficients::{CoefficientSet, DirectFormCoefficients, ResonatorCoefficients};
use super::state::{DirectFormHistory, FeedbackHistory, StereoState};
use super::FilterTopology;
use crate::error::Result;

/// Interleaved channels per frame
pub const STEREO: usize = 2;

#[derive(Debug, Clone)]
enum FilterKind {
    Resonator {
        coeffs: ResonatorCoefficients,
        state: StereoState<FeedbackHistory>,
    },
    BandPassResonator {
        coeffs: ResonatorCoefficients,
        state: StereoState<FeedbackHistory>,
    },
    DirectForm {
        coeffs: DirectFormCoefficients,
        state: StereoState<DirectFormHistory>,
    },
}

impl FilterKind {
    fn design(
        topology: FilterTopology,
        sample_rate: f64,
        frequency: f64,
        bandwidth: Option<f64>,
    ) -> Result<Self> {
        let kind = match CoefficientSet::design(topology, sample_rate, frequency, bandwidth)? {
            CoefficientSet::DirectForm(coeffs) => FilterKind::DirectForm {
                coeffs,
                state: StereoState::new(),
            },
            CoefficientSet::Resonator(coeffs) if topology == FilterTopology::BandPassResonator => {
                FilterKind::BandPassResonator {
                    coeffs,
                    state: StereoState::new(),
                }
            }
            CoefficientSet::Resonator(coeffs) => FilterKind::Resonator {
                coeffs,
                state: StereoState::new(),
            },
        };
        Ok(kind)
    }
}

/// A second-order filter running over an interleaved stereo stream
#[derive(Debug, Clone)]
pub struct StereoFilter {
    topology: FilterTopology,
    kind: FilterKind,
}

impl StereoFilter {
    /// Design coefficients for `topology` and start from zeroed history
    pub fn design(
        topology: FilterTopology,
        sample_rate: f64,
        frequency: f64,
        bandwidth: Option<f64>,
    ) -> Result<Self> {
        Ok(Self {
            topology,
            kind: FilterKind::design(topology, sample_rate, frequency, bandwidth)?,
        })
    }

    pub fn topology(&self) -> FilterTopology {
        self.topology
    }

    /// Coefficients currently in use
    pub fn coefficients(&self) -> CoefficientSet {
        match &self.kind {
            FilterKind::Resonator { coeffs, .. } | FilterKind::BandPassResonator { coeffs, .. } => {
                CoefficientSet::Resonator(*coeffs)
            }
            FilterKind::DirectForm { coeffs, .. } => CoefficientSet::DirectForm(*coeffs),
        }
    }

    /// Recompute coefficients for the same topology.
    ///
    /// History is left untouched; call [`reset`](Self::reset) before feeding a
    /// new stream or the output will start with a discontinuity.
    pub fn redesign(
        &mut self,
        sample_rate: f64,
        frequency: f64,
        bandwidth: Option<f64>,
    ) -> Result<()> {
        let fresh = FilterKind::design(self.topology, sample_rate, frequency, bandwidth)?;
        match (&mut self.kind, fresh) {
            (FilterKind::Resonator { coeffs, .. }, FilterKind::Resonator { coeffs: new, .. })
            | (
                FilterKind::BandPassResonator { coeffs, .. },
                FilterKind::BandPassResonator { coeffs: new, .. },
            ) => *coeffs = new,
            (FilterKind::DirectForm { coeffs, .. }, FilterKind::DirectForm { coeffs: new, .. }) => {
                *coeffs = new
            }
            (kind, fresh) => *kind = fresh,
        }
        Ok(())
    }

    /// Zero the recursion history of both channels
    pub fn reset(&mut self) {
        match &mut self.kind {
            FilterKind::Resonator { state, .. } | FilterKind::BandPassResonator { state, .. } => {
                state.reset()
            }
            FilterKind::DirectForm { state, .. } => state.reset(),
        }
    }

    /// True if no sample has been processed since construction or reset
    pub fn is_reset(&self) -> bool {
        match &self.kind {
            FilterKind::Resonator { state, .. } | FilterKind::BandPassResonator { state, .. } => {
                state.is_zeroed()
            }
            FilterKind::DirectForm { state, .. } => state.is_zeroed(),
        }
    }

    /// Filter `input` into `output`, one interleaved stereo frame at a time.
    ///
    /// # Panics
    /// If the buffers differ in length or hold a partial frame.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        assert_eq!(input.len(), output.len(), "input/output block size mismatch");
        assert_eq!(input.len() % STEREO, 0, "block holds a partial stereo frame");

        match &mut self.kind {
            FilterKind::Resonator { coeffs, state } => {
                run(state, input, output, |h, x| coeffs.resonate(h, x))
            }
            FilterKind::BandPassResonator { coeffs, state } => {
                run(state, input, output, |h, x| coeffs.band_pass(h, x))
            }
            FilterKind::DirectForm { coeffs, state } => {
                run(state, input, output, |h, x| coeffs.tick(h, x))
            }
        }
    }

    /// Filter an interleaved stereo block in place
    ///
    /// # Panics
    /// If the block holds a partial frame.
    pub fn process_in_place(&mut self, block: &mut [f32]) {
        assert_eq!(block.len() % STEREO, 0, "block holds a partial stereo frame");

        match &mut self.kind {
            FilterKind::Resonator { coeffs, state } => {
                run_in_place(state, block, |h, x| coeffs.resonate(h, x))
            }
            FilterKind::BandPassResonator { coeffs, state } => {
                run_in_place(state, block, |h, x| coeffs.band_pass(h, x))
            }
            FilterKind::DirectForm { coeffs, state } => {
                run_in_place(state, block, |h, x| coeffs.tick(h, x))
            }
        }
    }
}

fn run<H>(
    state: &mut StereoState<H>,
    input: &[f32],
    output: &mut [f32],
    tick: impl Fn(&mut H, f32) -> f32,
) {
    for (src, dst) in input
        .chunks_exact(STEREO)
        .zip(output.chunks_exact_mut(STEREO))
    {
        dst[0] = tick(&mut state.left, src[0]);
        dst[1] = tick(&mut state.right, src[1]);
    }
}

fn run_in_place<H>(state: &mut StereoState<H>, block: &mut [f32], tick: impl Fn(&mut H, f32) -> f32) {
    for frame in block.chunks_exact_mut(STEREO) {
        frame[0] = tick(&mut state.left, frame[0]);
        frame[1] = tick(&mut state.right, frame[1]);
    }
}

impl DirectFormCoefficients {
    /// y = a0*x + a1*x[n-1] + a2*x[n-2] - b1*y[n-1] - b2*y[n-2]
    #[inline]
    fn tick(&self, h: &mut DirectFormHistory, x: f32) -> f32 {
        let y = (self.a0 * f64::from(x) + self.a1 * f64::from(h.x1) + self.a2 * f64::from(h.x2)
            - self.b1 * f64::from(h.y1)
            - self.b2 * f64::from(h.y2)) as f32;

        h.x2 = h.x1;
        h.x1 = x;
        h.y2 = h.y1;
        h.y1 = y;

        y
    }
}

impl ResonatorCoefficients {
    /// y = x*scale + 2r*cos(theta)*y[n-1] - r^2*y[n-2]
    #[inline]
    fn resonate(&self, h: &mut FeedbackHistory, x: f32) -> f32 {
        let y = (f64::from(x) * self.scale + self.two_r_cos_theta * f64::from(h.w1)
            - self.r_squared * f64::from(h.w2)) as f32;

        h.w2 = h.w1;
        h.w1 = y;

        y
    }

    /// Direct form II: feedback into w, then y = w - r*w[n-2]
    #[inline]
    fn band_pass(&self, h: &mut FeedbackHistory, x: f32) -> f32 {
        let w = self.scale * f64::from(x) + self.two_r_cos_theta * f64::from(h.w1)
            - self.r_squared * f64::from(h.w2);
        // w[n-2] is read before the shift
        let y = (w - self.r * f64::from(h.w2)) as f32;

        h.w2 = h.w1;
        h.w1 = w as f32;

        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const ALL: [FilterTopology; 6] = FilterTopology::ALL;

    fn make(topology: FilterTopology) -> StereoFilter {
        StereoFilter::design(topology, 48000.0, 1000.0, Some(200.0)).unwrap()
    }

    /// Deterministic two-channel test signal
    fn signal(frames: usize) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let t = i as f32;
                [(t * 0.13).sin() * 0.8, (t * 0.031).cos() * 0.5 - 0.1]
            })
            .collect()
    }

    fn filtered(filter: &mut StereoFilter, input: &[f32]) -> Vec<f32> {
        let mut out = vec![0.0; input.len()];
        filter.process(input, &mut out);
        out
    }

    // Band reject diverges on long inputs, so compare bit patterns (NaN != NaN)
    fn bits(samples: &[f32]) -> Vec<u32> {
        samples.iter().map(|s| s.to_bits()).collect()
    }

    #[test_case(FilterTopology::Resonator ; "resonator")]
    #[test_case(FilterTopology::BandPassResonator ; "band pass resonator")]
    #[test_case(FilterTopology::ButterworthLowPass ; "low pass")]
    #[test_case(FilterTopology::ButterworthHighPass ; "high pass")]
    #[test_case(FilterTopology::ButterworthBandPass ; "band pass")]
    #[test_case(FilterTopology::ButterworthBandReject ; "band reject")]
    fn test_zero_in_zero_out(topology: FilterTopology) {
        let mut filter = make(topology);
        for frames in [0, 1, 7, 512] {
            let out = filtered(&mut filter, &vec![0.0; frames * STEREO]);
            assert!(out.iter().all(|&s| s == 0.0));
        }
        assert!(filter.is_reset());
    }

    #[test]
    fn test_split_blocks_match_single_block() {
        let input = signal(300);
        for topology in ALL {
            let whole = filtered(&mut make(topology), &input);

            for split in [1, 2, 150, 299] {
                let mut filter = make(topology);
                let (head, tail) = input.split_at(split * STEREO);
                let mut parts = filtered(&mut filter, head);
                parts.extend(filtered(&mut filter, tail));
                assert_eq!(bits(&whole), bits(&parts), "{topology} split at {split}");
            }
        }
    }

    #[test]
    fn test_reset_after_redesign_reproduces_output() {
        let input = signal(64);
        for topology in ALL {
            let mut filter = make(topology);
            let first = filtered(&mut filter, &input);

            filter.redesign(48000.0, 3000.0, Some(500.0)).unwrap();
            let other = filtered(&mut filter, &input);
            assert_ne!(first, other);

            filter.redesign(48000.0, 1000.0, Some(200.0)).unwrap();
            filter.reset();
            assert!(filter.is_reset());
            assert_eq!(bits(&first), bits(&filtered(&mut filter, &input)), "{topology}");
        }
    }

    #[test]
    fn test_redesign_without_reset_keeps_history() {
        let input = signal(64);
        let mut filter = make(FilterTopology::ButterworthLowPass);
        let first = filtered(&mut filter, &input);

        filter.redesign(48000.0, 1000.0, Some(200.0)).unwrap();
        assert!(!filter.is_reset());
        assert_ne!(first, filtered(&mut filter, &input));
    }

    #[test]
    fn test_redesign_rejects_invalid_parameters() {
        let mut filter = make(FilterTopology::Resonator);
        let before = filter.coefficients();
        assert!(filter.redesign(48000.0, 24000.0, Some(50.0)).is_err());
        assert_eq!(filter.coefficients(), before);
    }

    #[test]
    fn test_in_place_matches_separate_buffers() {
        let input = signal(200);
        for topology in ALL {
            let expected = filtered(&mut make(topology), &input);
            let mut block = input.clone();
            make(topology).process_in_place(&mut block);
            assert_eq!(bits(&expected), bits(&block), "{topology}");
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let input = signal(40);
        let left_only: Vec<f32> = input
            .chunks_exact(2)
            .flat_map(|f| [f[0], 0.0])
            .collect();

        for topology in ALL {
            let both = filtered(&mut make(topology), &input);
            let left = filtered(&mut make(topology), &left_only);
            for (frame, solo) in both.chunks_exact(2).zip(left.chunks_exact(2)) {
                assert_eq!(frame[0].to_bits(), solo[0].to_bits());
                assert_eq!(solo[1], 0.0);
            }
        }
    }

    #[test]
    fn test_low_pass_first_samples() {
        let mut filter =
            StereoFilter::design(FilterTopology::ButterworthLowPass, 44100.0, 1000.0, None)
                .unwrap();
        let CoefficientSet::DirectForm(c) = filter.coefficients() else {
            panic!("low pass must be direct form");
        };

        let input = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let out = filtered(&mut filter, &input);

        assert_eq!(out[0], (c.a0 * 1.0) as f32);
        assert_eq!(out[1], -(c.a0 as f32));
        let y1 = (c.a0 + c.a1 - c.b1 * f64::from(out[0])) as f32;
        assert_eq!(out[2], y1);
        assert_eq!(out[3], -y1);
    }

    #[test]
    fn test_band_pass_resonator_uses_old_history() {
        let mut filter =
            StereoFilter::design(FilterTopology::BandPassResonator, 48000.0, 440.0, Some(50.0))
                .unwrap();
        let CoefficientSet::Resonator(c) = filter.coefficients() else {
            panic!("band pass resonator must use resonator coefficients");
        };

        let mut input = vec![0.0; 8];
        input[0] = 1.0;
        let out = filtered(&mut filter, &input);

        let w0 = c.scale;
        let w1 = c.two_r_cos_theta * f64::from(w0 as f32);
        let w2 = c.two_r_cos_theta * f64::from(w1 as f32) - c.r_squared * f64::from(w0 as f32);
        assert_eq!(out[0], w0 as f32);
        assert_eq!(out[2], w1 as f32);
        // The zero at z = r first reaches the output two samples after the impulse
        assert_eq!(out[4], (w2 - c.r * f64::from(w0 as f32)) as f32);
    }

    #[test]
    fn test_nan_propagates() {
        let mut filter = make(FilterTopology::ButterworthBandPass);
        let out = filtered(&mut filter, &[f32::NAN, 0.0, 0.0, 0.0]);
        assert!(out[0].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[1], 0.0);
    }

    #[test]
    #[should_panic(expected = "partial stereo frame")]
    fn test_partial_frame_panics() {
        let mut filter = make(FilterTopology::Resonator);
        let mut out = [0.0; 3];
        filter.process(&[0.0; 3], &mut out);
    }
}
