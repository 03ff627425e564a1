//! Streaming engine
//!
//! - Block pipeline driving a filter from a source to a sink
//! - WAV file source and sink
//! - In-memory source and sink

pub mod io;
mod memory;
pub mod pipeline;

pub use io::{probe, AudioInfo, SampleEncoding, StreamProperties, WavSink, WavSource};
pub use memory::{generate_stereo_test_tone, MemorySink, MemorySource};
pub use pipeline::{filter_file, BlockPipeline, FileReport, FrameSink, FrameSource};
