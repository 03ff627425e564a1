//! WAV file I/O for the block pipeline
//!
//! Streams interleaved stereo frames from and to WAV files without loading
//! the whole file. Integer samples are normalized to [-1, 1) on read and
//! scaled back and clamped on write; 32-bit float passes through.
//!
//! Handles close on drop. A `WavSink` dropped without `finish` is still
//! finalized by hound, which leaves a playable (partial) file behind.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::pipeline::{FrameSink, FrameSource};
use crate::dsp::STEREO;
use crate::error::{FilterError, Result};

/// Sample encoding of a WAV stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Int8,
    Int16,
    Int24,
    Int32,
    Float32,
}

impl SampleEncoding {
    fn from_spec(spec: &WavSpec) -> Result<Self> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8) => Ok(SampleEncoding::Int8),
            (SampleFormat::Int, 16) => Ok(SampleEncoding::Int16),
            (SampleFormat::Int, 24) => Ok(SampleEncoding::Int24),
            (SampleFormat::Int, 32) => Ok(SampleEncoding::Int32),
            (SampleFormat::Float, 32) => Ok(SampleEncoding::Float32),
            (format, bits) => Err(FilterError::UnsupportedFormat {
                format: format!("{}-bit {:?} samples", bits, format),
            }),
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        match self {
            SampleEncoding::Int8 => 8,
            SampleEncoding::Int16 => 16,
            SampleEncoding::Int24 => 24,
            SampleEncoding::Int32 | SampleEncoding::Float32 => 32,
        }
    }

    pub fn sample_format(self) -> SampleFormat {
        match self {
            SampleEncoding::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        }
    }

    /// Short description for format reports ("16 bit", "floats")
    pub fn description(self) -> &'static str {
        match self {
            SampleEncoding::Int8 => "8 bit",
            SampleEncoding::Int16 => "16 bit",
            SampleEncoding::Int24 => "24 bit",
            SampleEncoding::Int32 => "32 bit",
            SampleEncoding::Float32 => "floats",
        }
    }

    /// Integer full scale, 2^(bits - 1)
    fn full_scale(self) -> f64 {
        f64::from(1u32 << (self.bits_per_sample() - 1))
    }
}

/// Properties of an audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamProperties {
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub channels: u16,
    pub encoding: SampleEncoding,
}

impl StreamProperties {
    /// Stereo stream properties
    pub fn stereo(sample_rate: u32, encoding: SampleEncoding) -> Self {
        Self {
            sample_rate,
            channels: STEREO as u16,
            encoding,
        }
    }

    fn from_spec(spec: &WavSpec) -> Result<Self> {
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            encoding: SampleEncoding::from_spec(spec)?,
        })
    }

    fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.encoding.bits_per_sample(),
            sample_format: self.encoding.sample_format(),
        }
    }

    fn require_stereo(&self) -> Result<()> {
        if self.channels as usize != STEREO {
            return Err(FilterError::UnsupportedFormat {
                format: format!("{}-channel audio (only stereo supported)", self.channels),
            });
        }
        Ok(())
    }
}

/// Summary of a WAV file, for format reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub properties: StreamProperties,
    /// Length in frames
    pub frames: u32,
}

impl AudioInfo {
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.frames) / f64::from(self.properties.sample_rate)
    }
}

/// Read the header of a WAV file of any channel count
pub fn probe(path: &Path) -> Result<AudioInfo> {
    let reader = open_reader(path)?;
    Ok(AudioInfo {
        properties: StreamProperties::from_spec(&reader.spec())?,
        frames: reader.duration(),
    })
}

fn open_reader(path: &Path) -> Result<WavReader<BufReader<File>>> {
    WavReader::open(path).map_err(|e| FilterError::FileOpen {
        path: path.display().to_string(),
        source: Some(Box::new(e)),
    })
}

fn to_io(err: hound::Error) -> io::Error {
    match err {
        hound::Error::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

// ============================================================================
// Source
// ============================================================================

/// Stereo WAV file read block by block
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    properties: StreamProperties,
}

impl WavSource {
    /// Open a stereo WAV file for reading
    ///
    /// # Errors
    /// * `FileOpen` - the file is missing or not a readable WAV file
    /// * `UnsupportedFormat` - not stereo, or an unsupported bit depth
    pub fn open(path: &Path) -> Result<Self> {
        let reader = open_reader(path)?;
        let properties = StreamProperties::from_spec(&reader.spec())?;
        properties.require_stereo()?;

        Ok(Self { reader, properties })
    }

    pub fn properties(&self) -> StreamProperties {
        self.properties
    }

    /// Total length of the file in frames
    pub fn frames_total(&self) -> u32 {
        self.reader.duration()
    }

    fn fill<S: hound::Sample>(&mut self, buf: &mut [f32], convert: impl Fn(S) -> f32) -> io::Result<usize> {
        let mut filled = 0;
        // `buf` is polled first, so no sample is consumed past its end
        for (slot, sample) in buf.iter_mut().zip(self.reader.samples::<S>()) {
            *slot = convert(sample.map_err(to_io)?);
            filled += 1;
        }
        Ok(filled)
    }
}

impl FrameSource for WavSource {
    fn read_frames(&mut self, buf: &mut [f32]) -> io::Result<usize> {
        let scale = self.properties.encoding.full_scale();
        let samples = match self.properties.encoding {
            SampleEncoding::Float32 => self.fill::<f32>(buf, |s| s)?,
            SampleEncoding::Int8 => self.fill::<i8>(buf, |s| (f64::from(s) / scale) as f32)?,
            SampleEncoding::Int16 => self.fill::<i16>(buf, |s| (f64::from(s) / scale) as f32)?,
            SampleEncoding::Int24 | SampleEncoding::Int32 => {
                self.fill::<i32>(buf, |s| (f64::from(s) / scale) as f32)?
            }
        };
        Ok(samples / STEREO)
    }
}

// ============================================================================
// Sink
// ============================================================================

/// Stereo WAV file written block by block
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    properties: StreamProperties,
    frames_written: u64,
}

impl WavSink {
    /// Create a WAV file with the given properties (usually the input's)
    pub fn create(path: &Path, properties: StreamProperties) -> Result<Self> {
        properties.require_stereo()?;

        let writer =
            WavWriter::create(path, properties.wav_spec()).map_err(|e| FilterError::FileCreate {
                path: path.display().to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            writer,
            properties,
            frames_written: 0,
        })
    }

    pub fn properties(&self) -> StreamProperties {
        self.properties
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush and update the header, returning the frames written
    pub fn finish(self) -> Result<u64> {
        let frames = self.frames_written;
        self.writer.finalize().map_err(|e| FilterError::Write {
            frames_processed: frames,
            requested: 0,
            written: 0,
            source: Some(Box::new(e)),
        })?;
        Ok(frames)
    }

    fn put<S: hound::Sample>(&mut self, samples: &[f32], convert: impl Fn(f32) -> S) -> io::Result<()> {
        for &sample in samples {
            self.writer.write_sample(convert(sample)).map_err(to_io)?;
        }
        Ok(())
    }
}

impl FrameSink for WavSink {
    fn write_frames(&mut self, buf: &[f32]) -> io::Result<usize> {
        let frames = buf.len() / STEREO;
        let samples = &buf[..frames * STEREO];

        let scale = self.properties.encoding.full_scale();
        let quantize = move |s: f32| (f64::from(s) * scale).round().clamp(-scale, scale - 1.0);

        match self.properties.encoding {
            SampleEncoding::Float32 => self.put(samples, |s| s)?,
            SampleEncoding::Int8 => self.put(samples, |s| quantize(s) as i8)?,
            SampleEncoding::Int16 => self.put(samples, |s| quantize(s) as i16)?,
            SampleEncoding::Int24 | SampleEncoding::Int32 => {
                self.put(samples, |s| quantize(s) as i32)?
            }
        }

        self.frames_written += frames as u64;
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;
    use test_case::test_case;

    fn ramp(frames: usize) -> Vec<f32> {
        (0..frames * STEREO)
            .map(|i| (i as f32 / (frames * STEREO) as f32) * 1.5 - 0.75)
            .collect()
    }

    fn read_all(source: &mut WavSource, block_frames: usize) -> Vec<f32> {
        let mut all = Vec::new();
        let mut buf = vec![0.0; block_frames * STEREO];
        loop {
            let frames = source.read_frames(&mut buf).unwrap();
            if frames == 0 {
                break;
            }
            all.extend_from_slice(&buf[..frames * STEREO]);
        }
        all
    }

    #[test_case(SampleEncoding::Int8, 1.0 / 64.0 ; "8 bit")]
    #[test_case(SampleEncoding::Int16, 1e-4 ; "16 bit")]
    #[test_case(SampleEncoding::Int24, 1e-6 ; "24 bit")]
    #[test_case(SampleEncoding::Int32, 1e-7 ; "32 bit int")]
    #[test_case(SampleEncoding::Float32, 0.0 ; "float")]
    fn test_write_then_read_blocks(encoding: SampleEncoding, tolerance: f32) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        let original = ramp(1000);

        let mut sink = WavSink::create(&path, StreamProperties::stereo(44100, encoding)).unwrap();
        for block in original.chunks(300 * STEREO) {
            assert_eq!(sink.write_frames(block).unwrap(), block.len() / STEREO);
        }
        assert_eq!(sink.finish().unwrap(), 1000);

        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.properties().encoding, encoding);
        assert_eq!(source.properties().sample_rate, 44100);
        assert_eq!(source.frames_total(), 1000);

        let read = read_all(&mut source, 128);
        assert_eq!(read.len(), original.len());
        for (a, b) in original.iter().zip(read.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = tolerance);
        }
    }

    #[test]
    fn test_integer_write_clamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let mut sink =
            WavSink::create(&path, StreamProperties::stereo(48000, SampleEncoding::Int16)).unwrap();
        sink.write_frames(&[4.0, -4.0]).unwrap();
        sink.finish().unwrap();

        let mut source = WavSource::open(&path).unwrap();
        let mut buf = [0.0; 2];
        assert_eq!(source.read_frames(&mut buf).unwrap(), 1);
        assert_abs_diff_eq!(buf[0], 32767.0 / 32768.0);
        assert_eq!(buf[1], -1.0);
    }

    #[test]
    fn test_open_missing_file() {
        match WavSource::open(Path::new("/nonexistent/path/audio.wav")) {
            Err(FilterError::FileOpen { path, .. }) => assert!(path.contains("nonexistent")),
            other => panic!("Expected FileOpen error, got: {:?}", other.err()),
        }
    }

    #[test]
    fn test_open_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not RIFF data").unwrap();

        let err = WavSource::open(&path).err().unwrap();
        assert_eq!(err.error_code(), "FILE_OPEN_ERROR");
    }

    #[test]
    fn test_open_rejects_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        let err = WavSource::open(&path).err().unwrap();
        assert!(matches!(err, FilterError::UnsupportedFormat { .. }));

        // Probing still reports the file
        let info = probe(&path).unwrap();
        assert_eq!(info.properties.channels, 1);
        assert_eq!(info.properties.encoding.description(), "16 bit");
        assert_eq!(info.frames, 1);
    }

    #[test]
    fn test_create_in_missing_directory() {
        let err = WavSink::create(
            Path::new("/nonexistent/dir/out.wav"),
            StreamProperties::stereo(44100, SampleEncoding::Int16),
        )
        .err()
        .unwrap();
        assert_eq!(err.error_code(), "FILE_CREATE_ERROR");
    }

    #[test]
    fn test_encoding_descriptions() {
        assert_eq!(SampleEncoding::Int24.description(), "24 bit");
        assert_eq!(SampleEncoding::Float32.description(), "floats");
        assert_eq!(SampleEncoding::Float32.bits_per_sample(), 32);
    }
}
