//! Filter module.
//!
//! Contains the filter registry and built-in filter implementations.

pub mod builtin;
pub mod registry;

pub use builtin::{BrightnessAdjust, Direction, EdgeDetection, GaussianBlur};
pub use registry::{FilterFactory, FilterRegistry, RegistryEntry};
