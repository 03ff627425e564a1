//! Block pipeline
//!
//! Pulls fixed-size blocks of interleaved stereo frames from a source, runs
//! them through one `StereoFilter`, and pushes them to a sink. The loop is
//! synchronous: each block is filtered and written before the next is read,
//! since the filter's history is mutated in place.
//!
//! The first read failure or short write stops the run. Nothing is retried
//! and output already written is left in place.

use std::io;
use std::path::Path;

use log::{debug, info, warn};

use super::io::{StreamProperties, WavSink, WavSource};
use crate::config::{FilterSpec, PipelineConfig};
use crate::dsp::{CoefficientSet, StereoFilter, STEREO};
use crate::error::{BoxedSource, FilterError, Result};

/// A stream of interleaved stereo frames
pub trait FrameSource {
    /// Read up to `buf.len() / 2` frames into `buf`.
    ///
    /// Returns the number of frames read; `0` means end of stream.
    fn read_frames(&mut self, buf: &mut [f32]) -> io::Result<usize>;
}

/// A destination for interleaved stereo frames
pub trait FrameSink {
    /// Write the whole frames in `buf`, returning how many were written.
    fn write_frames(&mut self, buf: &[f32]) -> io::Result<usize>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn read_frames(&mut self, buf: &mut [f32]) -> io::Result<usize> {
        (**self).read_frames(buf)
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn write_frames(&mut self, buf: &[f32]) -> io::Result<usize> {
        (**self).write_frames(buf)
    }
}

/// Filters a source into a sink, block by block
pub struct BlockPipeline {
    filter: StereoFilter,
    block_frames: usize,
    input: Vec<f32>,
    output: Vec<f32>,
    frames_processed: u64,
}

impl BlockPipeline {
    /// Allocate the processing blocks up front.
    ///
    /// # Errors
    /// * `InvalidParameter` - zero-frame blocks
    /// * `Allocation` - the block buffers could not be allocated
    pub fn new(filter: StereoFilter, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let block_frames = config.block_frames;

        Ok(Self {
            filter,
            block_frames,
            input: allocate_block(block_frames)?,
            output: allocate_block(block_frames)?,
            frames_processed: 0,
        })
    }

    pub fn filter(&self) -> &StereoFilter {
        &self.filter
    }

    pub fn block_frames(&self) -> usize {
        self.block_frames
    }

    /// Frames filtered and written so far, including by a failed run
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Run until the source is exhausted, returning the total frames processed.
    pub fn run<S, K>(&mut self, mut source: S, mut sink: K) -> Result<u64>
    where
        S: FrameSource,
        K: FrameSink,
    {
        loop {
            let frames = source
                .read_frames(&mut self.input)
                .map_err(|e| self.read_error(Some(e)))?;
            if frames == 0 {
                break;
            }
            if frames > self.block_frames {
                return Err(self.read_error(Some(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "source returned {} frames for a {}-frame block",
                        frames, self.block_frames
                    ),
                ))));
            }

            let len = frames * STEREO;
            self.filter.process(&self.input[..len], &mut self.output[..len]);

            let written = sink
                .write_frames(&self.output[..len])
                .map_err(|e| self.write_error(frames, 0, Some(e)))?;
            if written < frames {
                return Err(self.write_error(frames, written, None));
            }

            self.frames_processed += frames as u64;
            debug!("{} frames processed", self.frames_processed);
        }

        Ok(self.frames_processed)
    }

    fn read_error(&self, source: Option<io::Error>) -> FilterError {
        FilterError::Read {
            frames_processed: self.frames_processed,
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    fn write_error(&self, requested: usize, written: usize, source: Option<io::Error>) -> FilterError {
        FilterError::Write {
            frames_processed: self.frames_processed,
            requested,
            written,
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }
}

fn allocate_block(frames: usize) -> Result<Vec<f32>> {
    let len = frames.checked_mul(STEREO).ok_or_else(|| {
        FilterError::invalid_parameter("block_frames", frames, "a block that fits in memory")
    })?;
    let mut block = Vec::new();
    block
        .try_reserve_exact(len)
        .map_err(|source| FilterError::Allocation { frames, source })?;
    block.resize(len, 0.0);
    Ok(block)
}

/// Outcome of filtering one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Total stereo frames filtered and written
    pub frames: u64,
    /// Properties shared by input and output
    pub properties: StreamProperties,
    pub coefficients: CoefficientSet,
}

/// Filter a stereo WAV file into a new WAV file with the same format.
///
/// Parameters are validated against the input's sample rate before the
/// output file is created. On a read or write failure the partial output is
/// kept on disk.
pub fn filter_file(
    input: &Path,
    output: &Path,
    spec: &FilterSpec,
    config: &PipelineConfig,
) -> Result<FileReport> {
    let source = WavSource::open(input)?;
    let properties = source.properties();
    info!("Sample rate: {}", properties.sample_rate);
    info!("Infile is in {} format", properties.encoding.description());

    if spec.topology.is_suspect() {
        warn!(
            "{} coefficients are known to give poor results",
            spec.topology.display_name()
        );
    }

    let filter = spec.build(f64::from(properties.sample_rate))?;
    let coefficients = filter.coefficients();
    let mut pipeline = BlockPipeline::new(filter, config)?;

    let mut sink = WavSink::create(output, properties)?;
    info!(
        "{}: filtering {} into {}",
        spec.topology.display_name(),
        input.display(),
        output.display()
    );

    if let Err(e) = pipeline.run(source, &mut sink) {
        warn!(
            "Outfile is incomplete after {} frames",
            pipeline.frames_processed()
        );
        return Err(e);
    }

    let frames = sink.finish()?;
    debug!("Filter coefficients:\n{}", coefficients);
    info!("Done. {} sample frames processed", frames);

    Ok(FileReport {
        frames,
        properties,
        coefficients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::FilterTopology;
    use crate::engine::{MemorySink, MemorySource};
    use pretty_assertions::assert_eq;

    fn low_pass() -> StereoFilter {
        StereoFilter::design(FilterTopology::ButterworthLowPass, 44100.0, 1000.0, None).unwrap()
    }

    /// Source that fails after handing out `good` frames
    struct FailingSource {
        inner: MemorySource,
        good: usize,
    }

    impl FrameSource for FailingSource {
        fn read_frames(&mut self, buf: &mut [f32]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"));
            }
            let want = self.good.min(buf.len() / STEREO);
            let frames = self.inner.read_frames(&mut buf[..want * STEREO])?;
            self.good -= frames;
            Ok(frames)
        }
    }

    /// Sink that accepts at most `capacity` frames
    struct ShortSink {
        inner: MemorySink,
        capacity: usize,
    }

    impl FrameSink for ShortSink {
        fn write_frames(&mut self, buf: &[f32]) -> io::Result<usize> {
            let frames = self.capacity.min(buf.len() / STEREO);
            self.capacity -= frames;
            self.inner.write_frames(&buf[..frames * STEREO])
        }
    }

    #[test]
    fn test_run_matches_single_pass() {
        let input: Vec<f32> = (0..1000 * STEREO).map(|i| ((i * 7) % 13) as f32 / 13.0).collect();

        let mut expected = vec![0.0; input.len()];
        low_pass().process(&input, &mut expected);

        let mut pipeline =
            BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(64)).unwrap();
        let mut sink = MemorySink::new();
        let frames = pipeline.run(MemorySource::new(input), &mut sink).unwrap();

        assert_eq!(frames, 1000);
        assert_eq!(pipeline.frames_processed(), 1000);
        assert_eq!(sink.samples(), expected.as_slice());
    }

    #[test]
    fn test_empty_source() {
        let mut pipeline = BlockPipeline::new(low_pass(), &PipelineConfig::default()).unwrap();
        let mut sink = MemorySink::new();
        assert_eq!(pipeline.run(MemorySource::new(Vec::new()), &mut sink).unwrap(), 0);
        assert!(sink.samples().is_empty());
        assert!(pipeline.filter().is_reset());
    }

    #[test]
    fn test_read_error_stops_run() {
        let source = FailingSource {
            inner: MemorySource::new(vec![0.5; 300 * STEREO]),
            good: 150,
        };
        let mut sink = MemorySink::new();
        let mut pipeline =
            BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(100)).unwrap();

        match pipeline.run(source, &mut sink) {
            Err(FilterError::Read {
                frames_processed, ..
            }) => assert_eq!(frames_processed, 150),
            other => panic!("Expected Read error, got: {:?}", other),
        }
        assert_eq!(sink.frames(), 150);
    }

    #[test]
    fn test_short_write_stops_run() {
        let mut sink = ShortSink {
            inner: MemorySink::new(),
            capacity: 130,
        };
        let mut pipeline =
            BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(100)).unwrap();

        let err = pipeline
            .run(MemorySource::new(vec![0.5; 300 * STEREO]), &mut sink)
            .unwrap_err();
        match err {
            FilterError::Write {
                frames_processed,
                requested,
                written,
                ..
            } => {
                assert_eq!(frames_processed, 100);
                assert_eq!(requested, 100);
                assert_eq!(written, 30);
            }
            other => panic!("Expected Write error, got: {:?}", other),
        }
        assert_eq!(pipeline.frames_processed(), 100);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let err = BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(0))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_oversized_block_rejected() {
        let err = BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(usize::MAX))
            .err()
            .unwrap();
        assert_eq!(err.stage(), crate::error::Stage::Parameters);

        let err = BlockPipeline::new(low_pass(), &PipelineConfig::with_block_frames(usize::MAX / 4))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "ALLOCATION_ERROR");
    }
}
