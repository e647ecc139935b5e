//! Tone adjustment filters.

use crate::core::buffer::{to_sample, PixelBuffer};
use crate::core::error::FilterError;
use crate::core::filter::{Category, Filter, Parameters};
use crate::filters::registry::FilterRegistry;
use rayon::prelude::*;

const NAME: &str = "BrightnessAdjust";

/// Register tone filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(BrightnessAdjust::default()));
}

/// Scales every sample by a constant factor.
///
/// Each output sample is `round(sample * factor)` clamped to `0..=255`.
/// A factor of 1.0 is the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessAdjust {
    brightness_factor: f64,
}

impl BrightnessAdjust {
    /// Create a brightness filter. The factor must be non-negative.
    pub fn new(brightness_factor: f64) -> Result<Self, FilterError> {
        validate_factor(brightness_factor)?;
        Ok(Self { brightness_factor })
    }

    /// Current scale factor.
    pub fn brightness_factor(&self) -> f64 {
        self.brightness_factor
    }

    /// Change the scale factor.
    pub fn set_brightness_factor(&mut self, factor: f64) -> Result<(), FilterError> {
        validate_factor(factor)?;
        self.brightness_factor = factor;
        Ok(())
    }
}

impl Default for BrightnessAdjust {
    fn default() -> Self {
        Self {
            brightness_factor: 1.0,
        }
    }
}

fn validate_factor(factor: f64) -> Result<(), FilterError> {
    if !(factor.is_finite() && factor >= 0.0) {
        return Err(FilterError::invalid(
            NAME,
            "brightness_factor",
            format!("must be non-negative, got {}", factor),
        ));
    }
    Ok(())
}

impl Filter for BrightnessAdjust {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        log::debug!("{}: factor={} on {:?}", NAME, self.brightness_factor, input);

        let factor = self.brightness_factor;
        let mut output = input.blank_like();
        output
            .as_mut_slice()
            .par_iter_mut()
            .zip(input.as_slice().par_iter())
            .for_each(|(out, &sample)| *out = to_sample(f64::from(sample) * factor));
        output
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::Adjust
    }

    fn description(&self) -> &'static str {
        "Linear brightness scaling with clamping"
    }

    fn parameters(&self) -> Parameters {
        Parameters::from([("brightness_factor".to_string(), self.brightness_factor)])
    }

    fn set_parameters(&mut self, params: &Parameters) -> Result<(), FilterError> {
        if let Some(&factor) = params.get("brightness_factor") {
            self.set_brightness_factor(factor)?;
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(*self)
    }
}
