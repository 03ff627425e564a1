//! Per-channel recursion history
//!
//! History is stored at sample precision (f32); the recursion itself runs in
//! f64. Each channel owns its own history so left and right never alias.

/// Two-sample input and output history for one channel (direct form)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectFormHistory {
    pub x1: f32, // x[n-1]
    pub x2: f32, // x[n-2]
    pub y1: f32, // y[n-1]
    pub y2: f32, // y[n-2]
}

/// Two-sample feedback history for one channel (resonators)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackHistory {
    pub w1: f32, // w[n-1]
    pub w2: f32, // w[n-2]
}

/// Recursion state for a stereo stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoState<H> {
    pub left: H,
    pub right: H,
}

impl<H: Default + PartialEq> StereoState<H> {
    /// Zeroed state
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-zero both channels
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::default()
    }
}
