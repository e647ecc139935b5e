//! Core types and traits for the Rasterflow toolkit.
//!
//! This module contains the foundational types that every filter and
//! pipeline builds on:
//! - The pixel buffer and its statistics
//! - Square convolution kernels
//! - The `Filter` trait and parameter maps
//! - Error types

pub mod buffer;
pub mod error;
pub mod filter;
pub mod kernel;

// Re-export commonly used types
pub use buffer::{PixelBuffer, Sample};
pub use error::{
    BufferError, ConfigError, ErrorKind, FilterError, PipelineError, RasterError, RasterIoError,
};
pub use filter::{Category, Filter, Parameters};
pub use kernel::Kernel;
