//! Filter pipelines.
//!
//! A [`FilterPipeline`] owns an ordered list of filters and applies them in
//! sequence. Pipelines can be described in TOML or JSON through
//! [`PipelineConfig`].

pub mod chain;
pub mod config;
pub mod progress;

pub use chain::FilterPipeline;
pub use config::{FilterSpec, PipelineConfig};
pub use progress::PipelineProgress;
