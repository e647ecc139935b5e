//! Raster file I/O.
//!
//! [`pgm`] reads and writes binary graymaps with no external dependencies;
//! [`codec`] goes through the `image` crate for everything else.

pub mod codec;
pub mod pgm;
