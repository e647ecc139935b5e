//! # Rasterflow - Raster filtering toolkit
//!
//! Rasterflow applies convolution and point filters to 8-bit raster images and
//! chains them into reusable pipelines.
//!
//! ## Features
//!
//! - **Pixel buffers**: owned, row-major, interleaved 8-bit samples with any
//!   number of channels
//! - **Filters**: Gaussian blur, Sobel edge detection and brightness scaling
//!   behind one [`Filter`](core::filter::Filter) trait
//! - **Pipelines**: ordered filter chains, editable in place and loadable
//!   from TOML or JSON
//! - **Parallel**: filters process rows in parallel with rayon
//! - **I/O**: binary PGM, plus the formats supported by the `image` crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rasterflow::prelude::*;
//!
//! let image = rasterflow::io::pgm::load("input.pgm").unwrap();
//!
//! let mut pipeline = FilterPipeline::new();
//! pipeline.push(Box::new(GaussianBlur::new(1.0, 3)?));
//! pipeline.push(Box::new(BrightnessAdjust::new(1.2)?));
//! pipeline.push(Box::new(EdgeDetection::default()));
//!
//! let edges = pipeline.apply(&image);
//! rasterflow::io::pgm::save(&edges, "edges.pgm");
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: pixel buffers, kernels, the filter trait and error handling
//! - [`filters`]: filter registry and built-in filters
//! - [`pipeline`]: filter chains and their configuration files
//! - [`io`]: raster file formats

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod filters;
pub mod io;
pub mod pipeline;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use rasterflow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::buffer::{PixelBuffer, Sample};
    pub use crate::core::filter::{Category, Filter, Parameters};
    pub use crate::core::kernel::Kernel;

    // Errors
    pub use crate::core::error::{
        BufferError, ConfigError, ErrorKind, FilterError, PipelineError, RasterError,
        RasterIoError, RasterResult,
    };

    // Filters
    pub use crate::filters::builtin::{BrightnessAdjust, Direction, EdgeDetection, GaussianBlur};
    pub use crate::filters::registry::{FilterFactory, FilterRegistry, RegistryEntry};

    // Pipeline
    pub use crate::pipeline::{FilterPipeline, FilterSpec, PipelineConfig, PipelineProgress};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
