//! Square convolution kernels.
//!
//! Kernels are stored row-major in a flat vector. The centre cell sits at
//! `(size / 2, size / 2)`, so offsets relative to the centre range over
//! `-(size / 2)..=(size - 1 - size / 2)`.

use crate::core::error::FilterError;

/// A square matrix of convolution weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kernel {
    size: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Largest side length accepted by [`Kernel::gaussian`].
    pub const MAX_SIZE: usize = 1001;

    /// Create a kernel from row-major weights.
    ///
    /// `weights.len()` must equal `size * size`.
    pub fn new(size: usize, weights: Vec<f64>) -> Result<Self, FilterError> {
        if weights.len() != size * size {
            return Err(FilterError::NonSquareKernel {
                rows: size,
                columns: if size == 0 { weights.len() } else { weights.len() / size },
            });
        }
        Ok(Self { size, weights })
    }

    /// Create a kernel from nested rows. Every row must have as many
    /// columns as there are rows.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, FilterError>
    where
        R: AsRef<[f64]>,
    {
        let size = rows.len();
        let mut weights = Vec::with_capacity(size * size);
        for row in rows {
            let row = row.as_ref();
            if row.len() != size {
                return Err(FilterError::NonSquareKernel {
                    rows: size,
                    columns: row.len(),
                });
            }
            weights.extend_from_slice(row);
        }
        Ok(Self { size, weights })
    }

    /// Generate a normalized 2D Gaussian kernel.
    ///
    /// Each cell is `exp(-((dx/σ)² + (dy/σ)²) / 2)` for its offset from the
    /// centre, then every cell is divided by the total so the kernel sums
    /// to 1. The usual `1 / (2πσ²)` factor cancels in that division and is
    /// omitted, which keeps extreme sigmas finite. `size` may not exceed
    /// [`Kernel::MAX_SIZE`].
    pub fn gaussian(sigma: f64, size: usize) -> Result<Self, FilterError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilterError::invalid("GaussianBlur", "sigma", format!("must be positive, got {}", sigma)));
        }
        if size == 0 || size % 2 == 0 {
            return Err(FilterError::invalid(
                "GaussianBlur",
                "kernel_size",
                format!("must be a positive odd number, got {}", size),
            ));
        }
        let cells = size
            .checked_mul(size)
            .filter(|_| size <= Self::MAX_SIZE)
            .ok_or_else(|| {
                FilterError::invalid(
                    "GaussianBlur",
                    "kernel_size",
                    format!("must be at most {}, got {}", Self::MAX_SIZE, size),
                )
            })?;

        let half = (size / 2) as f64;
        let mut weights = Vec::with_capacity(cells);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f64 - half) / sigma;
                let dy = (y as f64 - half) / sigma;
                weights.push((-(dx * dx + dy * dy) / 2.0).exp());
            }
        }

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Ok(Self { size, weights })
    }

    /// Horizontal Sobel kernel `[[-1,0,1],[-2,0,2],[-1,0,1]]`.
    pub fn sobel_x() -> Self {
        Self {
            size: 3,
            weights: vec![-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0],
        }
    }

    /// Vertical Sobel kernel `[[-1,-2,-1],[0,0,0],[1,2,1]]`.
    pub fn sobel_y() -> Self {
        Self {
            size: 3,
            weights: vec![-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0],
        }
    }

    /// Side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the centre cell along either axis.
    pub fn half(&self) -> usize {
        self.size / 2
    }

    /// Whether the kernel has no cells.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight at column `kx`, row `ky`.
    ///
    /// Panics if either index is `>= size`.
    #[inline]
    pub fn get(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }

    /// All weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Rows of the kernel, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.weights.chunks(self.size.max(1))
    }
}
