//! Sobel edge detection.

use crate::core::buffer::{to_sample, PixelBuffer};
use crate::core::error::FilterError;
use crate::core::filter::{integral_parameter, Category, Filter, Parameters};
use crate::core::kernel::Kernel;
use crate::filters::registry::FilterRegistry;
use rayon::prelude::*;
use std::fmt;

const NAME: &str = "EdgeDetection";

/// Register edge filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(EdgeDetection::default()));
}

/// Which gradient components contribute to the edge magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Horizontal gradient only (`Gx`).
    Horizontal,
    /// Vertical gradient only (`Gy`).
    Vertical,
    /// Full gradient magnitude.
    #[default]
    Both,
}

impl Direction {
    /// Numeric code used in parameter maps.
    pub fn code(self) -> i64 {
        match self {
            Direction::Horizontal => 0,
            Direction::Vertical => 1,
            Direction::Both => 2,
        }
    }

    /// Parse a numeric parameter code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Direction::Horizontal),
            1 => Some(Direction::Vertical),
            2 => Some(Direction::Both),
            _ => None,
        }
    }

    fn uses_x(self) -> bool {
        matches!(self, Direction::Horizontal | Direction::Both)
    }

    fn uses_y(self) -> bool {
        matches!(self, Direction::Vertical | Direction::Both)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
            Direction::Both => "both",
        })
    }
}

/// Sobel gradient magnitude.
///
/// Only interior pixels with a complete 3x3 neighbourhood are computed; the
/// one-pixel border of the output is left at 0. The gradient is always
/// sampled from channel 0 and the resulting magnitude is written to every
/// output channel, so multi-channel inputs produce a replicated grayscale
/// edge map.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDetection {
    direction: Direction,
    sobel_x: Kernel,
    sobel_y: Kernel,
}

impl EdgeDetection {
    /// Create an edge detector for the given direction.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            sobel_x: Kernel::sobel_x(),
            sobel_y: Kernel::sobel_y(),
        }
    }

    /// Current direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Change the direction.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Raw 3x3 response of `kernel` centred on interior pixel `(x, y)`,
    /// sampled from channel 0.
    fn response(input: &PixelBuffer, kernel: &Kernel, x: usize, y: usize) -> f64 {
        let mut sum = 0.0;
        for ky in 0..3 {
            for kx in 0..3 {
                let sample = input.sample(x + kx - 1, y + ky - 1, 0);
                sum += f64::from(sample) * kernel.get(kx, ky);
            }
        }
        sum
    }
}

impl Default for EdgeDetection {
    fn default() -> Self {
        Self::new(Direction::default())
    }
}

impl Filter for EdgeDetection {
    fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let mut output = input.blank_like();
        let (width, height) = input.size();
        if width < 3 || height < 3 {
            return output;
        }

        let channels = input.channels();
        let row_len = width * channels;
        log::debug!("{}: direction={} on {}x{}x{}", NAME, self.direction, width, height, channels);

        output
            .as_mut_slice()
            .par_chunks_mut(row_len)
            .enumerate()
            .skip(1)
            .take(height - 2)
            .for_each(|(y, row)| {
                for x in 1..width - 1 {
                    let gx = if self.direction.uses_x() {
                        Self::response(input, &self.sobel_x, x, y)
                    } else {
                        0.0
                    };
                    let gy = if self.direction.uses_y() {
                        Self::response(input, &self.sobel_y, x, y)
                    } else {
                        0.0
                    };
                    let magnitude = to_sample((gx * gx + gy * gy).sqrt());
                    row[x * channels..(x + 1) * channels].fill(magnitude);
                }
            });

        output
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> Category {
        Category::Edge
    }

    fn description(&self) -> &'static str {
        "Sobel gradient magnitude computed from channel 0"
    }

    fn parameters(&self) -> Parameters {
        Parameters::from([("direction".to_string(), self.direction.code() as f64)])
    }

    fn set_parameters(&mut self, params: &Parameters) -> Result<(), FilterError> {
        if let Some(&value) = params.get("direction") {
            let code = integral_parameter(NAME, "direction", value)?;
            let direction = Direction::from_code(code).ok_or_else(|| {
                FilterError::invalid(
                    NAME,
                    "direction",
                    format!("must be 0 (horizontal), 1 (vertical) or 2 (both), got {}", code),
                )
            })?;
            self.set_direction(direction);
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
