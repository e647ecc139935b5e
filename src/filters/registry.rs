//! Filter registry for creating filters by name.
//!
//! Configuration files and the command line refer to filters by name; the
//! registry maps each name to a factory producing a default-configured
//! instance, which is then tuned through [`Filter::set_parameters`].

use crate::core::error::PipelineError;
use crate::core::filter::{Category, Filter, Parameters};
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating filter instances.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// Registry entry containing the factory and cached metadata.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: FilterFactory,
    /// Filter name, as returned by [`Filter::name`].
    pub name: &'static str,
    /// Category for grouping.
    pub category: Category,
    /// One-line description.
    pub description: &'static str,
    /// Parameters of a freshly created instance.
    pub defaults: Parameters,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Registry for all available filter types, in registration order.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    filters: IndexMap<String, RegistryEntry>,
}

impl FilterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::filters::builtin::register_all(&mut registry);
        registry
    }

    /// Register a filter type. A later registration with the same name
    /// replaces the earlier one.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Filter> + Send + Sync + 'static,
    {
        // Create a temporary instance to get metadata
        let instance = factory();
        let entry = RegistryEntry {
            factory: Arc::new(factory),
            name: instance.name(),
            category: instance.category(),
            description: instance.description(),
            defaults: instance.parameters(),
        };
        self.filters.insert(entry.name.to_string(), entry);
    }

    /// Remove a filter type. Returns whether it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.filters.shift_remove(name).is_some()
    }

    /// Create a default instance of a filter by name.
    ///
    /// Names match exactly (`"GaussianBlur"`) or ignoring case and
    /// underscores (`"gaussian_blur"`).
    pub fn create(&self, name: &str) -> Option<Box<dyn Filter>> {
        self.get_entry(name).map(|e| (e.factory)())
    }

    /// Create a filter by name and apply `params` to it.
    pub fn create_with(&self, name: &str, params: &Parameters) -> Result<Box<dyn Filter>, PipelineError> {
        let mut filter = self
            .create(name)
            .ok_or_else(|| PipelineError::UnknownFilter(name.to_string()))?;
        filter.set_parameters(params)?;
        Ok(filter)
    }

    /// Look up a registry entry.
    pub fn get_entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.filters.get(name).or_else(|| {
            let wanted = canonical(name);
            self.filters
                .values()
                .find(|entry| canonical(entry.name) == wanted)
        })
    }

    /// Check if a filter is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get_entry(name).is_some()
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(|s| s.as_str())
    }

    /// All registered entries, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.filters.values()
    }

    /// Names of filters in a category.
    pub fn filters_by_category(&self, category: Category) -> Vec<&str> {
        self.filters
            .values()
            .filter(|e| e.category == category)
            .map(|e| e.name)
            .collect()
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

fn canonical(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
