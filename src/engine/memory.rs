//! In-memory frame streams
//!
//! Useful for filtering buffers that are already decoded, and for tests.

use std::f32::consts::PI;
use std::io;

use super::pipeline::{FrameSink, FrameSource};
use crate::dsp::STEREO;

/// Reads interleaved stereo frames from a buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    samples: Vec<f32>,
    position: usize,
}

impl MemorySource {
    /// A trailing partial frame is never read
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Frames not yet read
    pub fn remaining_frames(&self) -> usize {
        (self.samples.len() - self.position) / STEREO
    }
}

impl FrameSource for MemorySource {
    fn read_frames(&mut self, buf: &mut [f32]) -> io::Result<usize> {
        let frames = self.remaining_frames().min(buf.len() / STEREO);
        let len = frames * STEREO;
        buf[..len].copy_from_slice(&self.samples[self.position..self.position + len]);
        self.position += len;
        Ok(frames)
    }
}

/// Collects interleaved stereo frames
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    samples: Vec<f32>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / STEREO
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

impl FrameSink for MemorySink {
    fn write_frames(&mut self, buf: &[f32]) -> io::Result<usize> {
        let frames = buf.len() / STEREO;
        self.samples.extend_from_slice(&buf[..frames * STEREO]);
        Ok(frames)
    }
}

/// Generate interleaved stereo sine waves, one frequency per channel
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    frames: usize,
    sample_rate: u32,
) -> Vec<f32> {
    let angular_freq_l = 2.0 * PI * freq_left / sample_rate as f32;
    let angular_freq_r = 2.0 * PI * freq_right / sample_rate as f32;

    (0..frames)
        .flat_map(|i| {
            let t = i as f32;
            [(angular_freq_l * t).sin(), (angular_freq_r * t).sin()]
        })
        .collect()
}
