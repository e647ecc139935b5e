//! Pipeline description files.
//!
//! A pipeline is stored as an ordered list of filter names with their
//! parameters, in TOML:
//!
//! ```toml
//! [[filters]]
//! name = "GaussianBlur"
//! sigma = 1.5
//! kernel_size = 5
//!
//! [[filters]]
//! name = "EdgeDetection"
//! ```
//!
//! or the equivalent JSON. Names are resolved through a [`FilterRegistry`].

use crate::core::error::ConfigError;
use crate::core::filter::Parameters;
use crate::filters::registry::FilterRegistry;
use crate::pipeline::chain::FilterPipeline;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One filter entry in a pipeline description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Registered filter name.
    pub name: String,
    /// Parameter overrides; missing keys keep the filter's defaults.
    #[serde(flatten)]
    pub params: Parameters,
}

impl FilterSpec {
    /// An entry with no parameter overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Parameters::new(),
        }
    }

    /// Add a parameter override, builder style.
    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Serializable description of a [`FilterPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Filters in application order
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

fn default_version() -> String {
    PipelineConfig::VERSION.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            filters: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Current format version.
    pub const VERSION: &'static str = "1.0";

    /// An empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter entry, builder style.
    pub fn with_filter(mut self, spec: FilterSpec) -> Self {
        self.filters.push(spec);
        self
    }

    /// Parse a TOML description.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON description.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a description from disk, choosing the format by extension
    /// (`.toml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_str(&std::fs::read_to_string(path)?),
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a pipeline using the built-in filters.
    pub fn build(&self) -> Result<FilterPipeline, ConfigError> {
        self.build_with(&FilterRegistry::with_builtins())
    }

    /// Build a pipeline, resolving names through `registry`.
    ///
    /// Fails on the first unknown name or rejected parameter, reporting the
    /// position of the offending entry.
    pub fn build_with(&self, registry: &FilterRegistry) -> Result<FilterPipeline, ConfigError> {
        let mut pipeline = FilterPipeline::new();
        for (index, spec) in self.filters.iter().enumerate() {
            let filter = registry
                .create_with(&spec.name, &spec.params)
                .map_err(|error| ConfigError::Pipeline { index, error })?;
            pipeline.push(filter);
        }
        log::debug!("built pipeline from config: {:?}", pipeline.filter_names());
        Ok(pipeline)
    }
}

impl FilterPipeline {
    /// Describe this pipeline as a [`PipelineConfig`] that rebuilds it.
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            version: default_version(),
            filters: self
                .iter()
                .map(|f| FilterSpec {
                    name: f.name().to_string(),
                    params: f.parameters(),
                })
                .collect(),
        }
    }
}
