//! Error handling for filterbank
//!
//! Every error names the stage that failed so the front end can report it.

use thiserror::Error;

/// Result type alias for filterbank operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Boxed error from an I/O collaborator
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Stage of a filtering run in which an error originated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parameters,
    Open,
    Create,
    Allocation,
    Read,
    Write,
    Config,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Parameters => "parameter validation",
            Stage::Open => "open",
            Stage::Create => "create",
            Stage::Allocation => "allocation",
            Stage::Read => "read",
            Stage::Write => "write",
            Stage::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Main error type for filterbank operations
#[derive(Error, Debug)]
pub enum FilterError {
    // Parameter Errors
    #[error("Invalid parameter {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Unknown filter topology: {name}")]
    UnknownTopology { name: String },

    // File Errors
    #[error("Unable to open infile {path}")]
    FileOpen {
        path: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Unable to create outfile {path}")]
    FileCreate {
        path: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Stream Errors
    #[error("Error reading infile after {frames_processed} frames")]
    Read {
        frames_processed: u64,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Error writing to outfile: {written} of {requested} frames written after {frames_processed} frames")]
    Write {
        frames_processed: u64,
        requested: usize,
        written: usize,
        #[source]
        source: Option<BoxedSource>,
    },

    // Resource Errors
    #[error("Unable to allocate a {frames}-frame processing block")]
    Allocation {
        frames: usize,
        #[source]
        source: std::collections::TryReserveError,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FilterError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid_parameter(
        param: &str,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        FilterError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::InvalidParameter { .. } => "INVALID_PARAMETER",
            FilterError::UnknownTopology { .. } => "UNKNOWN_TOPOLOGY",
            FilterError::FileOpen { .. } => "FILE_OPEN_ERROR",
            FilterError::FileCreate { .. } => "FILE_CREATE_ERROR",
            FilterError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            FilterError::Read { .. } => "READ_ERROR",
            FilterError::Write { .. } => "WRITE_ERROR",
            FilterError::Allocation { .. } => "ALLOCATION_ERROR",
            FilterError::Io(_) => "IO_ERROR",
            FilterError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Stage of the run that failed
    pub fn stage(&self) -> Stage {
        match self {
            FilterError::InvalidParameter { .. } | FilterError::UnknownTopology { .. } => {
                Stage::Parameters
            }
            FilterError::FileOpen { .. } | FilterError::UnsupportedFormat { .. } => Stage::Open,
            FilterError::FileCreate { .. } => Stage::Create,
            FilterError::Read { .. } => Stage::Read,
            FilterError::Write { .. } => Stage::Write,
            FilterError::Allocation { .. } => Stage::Allocation,
            FilterError::Io(_) | FilterError::Serialization(_) => Stage::Config,
        }
    }

    /// True when the output file may have been left partially written
    pub fn leaves_partial_output(&self) -> bool {
        matches!(self, FilterError::Read { .. } | FilterError::Write { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            FilterError::InvalidParameter { .. } => vec![
                "Frequency must lie strictly between 0 Hz and half the sample rate",
                "Bandwidth must be greater than 0 Hz",
            ],
            FilterError::UnknownTopology { .. } => vec![
                "Run 'filterbank-cli list' to see the available filters",
                "Filters can be selected by name or by index (0-5)",
            ],
            FilterError::FileOpen { .. } => vec![
                "Check the file path is correct",
                "Verify the file is a readable WAV file",
            ],
            FilterError::FileCreate { .. } => vec![
                "Check the output directory exists and is writable",
            ],
            FilterError::UnsupportedFormat { .. } => vec![
                "Convert the input to a stereo WAV file first",
                "Supported sample formats: 8/16/24/32-bit integer, 32-bit float",
            ],
            FilterError::Read { .. } | FilterError::Write { .. } => vec![
                "The output file is incomplete and should be discarded",
                "Check free disk space and retry",
            ],
            FilterError::Allocation { .. } => vec![
                "Try a smaller block size with --block-frames",
            ],
            _ => vec![],
        }
    }
}
