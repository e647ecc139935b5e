//! The Filter trait and its parameter map.
//!
//! Every concrete filter is a plain struct holding only its own numeric
//! parameters. Filters never hold a reference to a buffer, so a single
//! instance can be applied to any number of buffers, including from several
//! threads at once.

use crate::core::buffer::PixelBuffer;
use crate::core::error::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric key/value view of a filter's tunable state.
pub type Parameters = BTreeMap<String, f64>;

/// Category for organizing filters in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Smoothing filters
    Blur,
    /// Edge detection
    Edge,
    /// Per-sample tone adjustments
    Adjust,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Blur => "Blur",
            Category::Edge => "Edge",
            Category::Adjust => "Adjust",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The core trait for image filters.
///
/// # Contract
///
/// - `apply` is pure: it never mutates the input and always returns a newly
///   allocated buffer with the input's width, height and channel count.
/// - `set_parameters` ignores unknown keys. Recognized keys are all
///   validated before any is applied, so an `Err` leaves the filter exactly
///   as it was.
/// - `clone_box` returns an independent copy with identical parameters.
///
/// # Thread Safety
///
/// `Send + Sync` bounds allow one filter to be applied to different buffers
/// from multiple threads. Setters take `&mut self` and therefore cannot run
/// concurrently with `apply`.
pub trait Filter: Send + Sync + fmt::Debug {
    /// Apply the filter, producing a new buffer.
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer;

    /// Constant name of this filter type (e.g. `"GaussianBlur"`).
    fn name(&self) -> &'static str;

    /// Category used for grouping in listings.
    fn category(&self) -> Category;

    /// One-line human readable description.
    fn description(&self) -> &'static str {
        ""
    }

    /// Current tunable parameters.
    fn parameters(&self) -> Parameters;

    /// Update parameters from a map. Unknown keys are ignored.
    fn set_parameters(&mut self, params: &Parameters) -> Result<(), FilterError>;

    /// Clone this filter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Filter>;
}

// Allow cloning Box<dyn Filter>
impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Read an integral parameter, rejecting fractional or non-finite values.
pub(crate) fn integral_parameter(
    filter: &'static str,
    key: &str,
    value: f64,
) -> Result<i64, FilterError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(FilterError::invalid(
            filter,
            key,
            format!("must be an integer, got {}", value),
        ));
    }
    Ok(value as i64)
}
