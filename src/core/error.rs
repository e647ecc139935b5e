//! Error types for Rasterflow.
//!
//! Uses thiserror for structured errors with context. Each concern gets its
//! own enum so callers can match precisely, and every error can be reduced to
//! one of four coarse [`ErrorKind`]s:
//! - `InvalidDimension`: non-positive width/height/channels
//! - `InvalidArgument`: a filter parameter or pipeline argument is invalid
//! - `OutOfRange`: a pixel coordinate or pipeline index is outside bounds
//! - `IoFailure`: a file could not be read, written or parsed

use std::fmt;
use thiserror::Error;

/// Coarse classification shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Width, height or channel count is zero (or otherwise unusable).
    InvalidDimension,
    /// A filter parameter or pipeline argument is invalid.
    InvalidArgument,
    /// A coordinate, channel or index lies outside the valid range.
    OutOfRange,
    /// A file could not be opened, written or decoded.
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidDimension => "invalid dimension",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::IoFailure => "I/O failure",
        };
        f.write_str(name)
    }
}

/// Top-level error type for Rasterflow.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Raster I/O error: {0}")]
    RasterIo(#[from] RasterIoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by [`PixelBuffer`](crate::core::buffer::PixelBuffer)
/// construction and addressing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Dimensions must be positive, got {width}x{height} with {channels} channel(s)")]
    InvalidDimension {
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Sample buffer holds {actual} samples, expected {expected}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Pixel ({x}, {y}) channel {channel} is outside a {width}x{height}x{channels} buffer")]
    OutOfRange {
        x: i64,
        y: i64,
        channel: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("Channel {channel} does not exist in a buffer with {channels} channel(s)")]
    ChannelOutOfRange { channel: usize, channels: usize },
}

/// Errors from filter construction and parameter updates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{filter}: invalid '{parameter}': {reason}")]
    InvalidArgument {
        filter: &'static str,
        parameter: String,
        reason: String,
    },

    #[error("Kernel must be square, got {rows} row(s) with a row of {columns} column(s)")]
    NonSquareKernel { rows: usize, columns: usize },
}

impl FilterError {
    /// Shorthand for building an [`FilterError::InvalidArgument`].
    pub fn invalid(
        filter: &'static str,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FilterError::InvalidArgument {
            filter,
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from pipeline editing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Filter cannot be absent")]
    MissingFilter,

    #[error("Filter index {index} is out of range for a pipeline of {len} filter(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Errors from reading or writing raster files.
#[derive(Error, Debug)]
pub enum RasterIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported magic token '{0}', expected 'P5'")]
    BadMagic(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Expected {expected} samples, found only {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Format stores a single channel, buffer has {0}")]
    UnsupportedChannels(usize),

    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Errors from loading or building a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported configuration format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("Filter #{index}: {error}")]
    Pipeline { index: usize, error: PipelineError },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl BufferError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BufferError::InvalidDimension { .. } | BufferError::SampleCountMismatch { .. } => {
                ErrorKind::InvalidDimension
            }
            BufferError::OutOfRange { .. } | BufferError::ChannelOutOfRange { .. } => {
                ErrorKind::OutOfRange
            }
        }
    }
}

impl FilterError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl PipelineError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::IndexOutOfRange { .. } => ErrorKind::OutOfRange,
            PipelineError::MissingFilter
            | PipelineError::UnknownFilter(_)
            | PipelineError::Filter(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl RasterIoError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterIoError::Buffer(e) => e.kind(),
            _ => ErrorKind::IoFailure,
        }
    }
}

impl ConfigError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Pipeline { error, .. } => error.kind(),
            _ => ErrorKind::IoFailure,
        }
    }
}

impl RasterError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RasterError::Buffer(e) => e.kind(),
            RasterError::Filter(e) => e.kind(),
            RasterError::Pipeline(e) => e.kind(),
            RasterError::RasterIo(e) => e.kind(),
            RasterError::Config(e) => e.kind(),
        }
    }
}

/// Result type alias for Rasterflow operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Result type alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Result type alias for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
