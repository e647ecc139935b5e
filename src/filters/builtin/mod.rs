//! Built-in filter implementations.
//!
//! This module contains the standard filters that ship with Rasterflow.

mod blur;
mod color;
mod edge;

use crate::filters::registry::FilterRegistry;

/// Register all built-in filters.
pub fn register_all(registry: &mut FilterRegistry) {
    blur::register(registry);
    edge::register(registry);
    color::register(registry);
}

// Re-export for direct access
pub use blur::GaussianBlur;
pub use color::BrightnessAdjust;
pub use edge::{Direction, EdgeDetection};
