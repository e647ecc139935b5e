//! The pixel buffer that flows through every filter.
//!
//! A [`PixelBuffer`] owns interleaved 8-bit samples. Sample `(x, y, c)` lives
//! at index `(y * width + x) * channels + c`, and `data.len()` always equals
//! `width * height * channels`.

use crate::core::error::{BufferError, BufferResult};
use crate::core::kernel::Kernel;
use rayon::prelude::*;
use std::fmt;

/// One 8-bit channel value at one pixel.
pub type Sample = u8;

/// Number of distinct sample values, and the length of a histogram.
pub const SAMPLE_LEVELS: usize = 256;

/// Round a filter result to the nearest integer and clamp it into `0..=255`.
#[inline]
pub fn to_sample(value: f64) -> Sample {
    value.round().clamp(0.0, 255.0) as Sample
}

/// Owned, interleaved 8-bit image storage.
///
/// Copies are deep (`Clone` never aliases storage). Moving a buffer
/// transfers its storage; [`PixelBuffer::take`] does the same through a
/// mutable reference and leaves an empty buffer behind.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<Sample>,
}

impl Default for PixelBuffer {
    /// An empty 0x0 buffer with one channel and no samples.
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            channels: 1,
            data: Vec::new(),
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("samples", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    ///
    /// Fails with [`BufferError::InvalidDimension`] if any dimension is zero
    /// or the sample count overflows `usize`.
    pub fn new(width: usize, height: usize, channels: usize) -> BufferResult<Self> {
        let len = sample_count(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0; len],
        })
    }

    /// Allocate a zero-filled single-channel buffer.
    pub fn grayscale(width: usize, height: usize) -> BufferResult<Self> {
        Self::new(width, height, 1)
    }

    /// Wrap existing interleaved samples.
    pub fn from_raw(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<Sample>,
    ) -> BufferResult<Self> {
        let expected = sample_count(width, height, channels)?;
        if data.len() != expected {
            return Err(BufferError::SampleCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> BufferResult<Self>
    where
        F: FnMut(usize, usize, usize) -> Sample,
    {
        let mut buffer = Self::new(width, height, channels)?;
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    let idx = buffer.index(x, y, c);
                    buffer.data[idx] = f(x, y, c);
                }
            }
        }
        Ok(buffer)
    }

    // ========================================================================
    // Dimensions
    // ========================================================================

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Total number of samples (`width * height * channels`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether another buffer has the same width, height and channel count.
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// All samples in interleaved row-major order.
    pub fn as_slice(&self) -> &[Sample] {
        &self.data
    }

    /// Mutable view of all samples.
    pub fn as_mut_slice(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// Consume the buffer and return its samples.
    pub fn into_raw(self) -> Vec<Sample> {
        self.data
    }

    /// Move the storage out, leaving an empty buffer in its place.
    pub fn take(&mut self) -> PixelBuffer {
        std::mem::take(self)
    }

    /// Allocate a zero-filled buffer with this buffer's shape.
    ///
    /// An empty buffer yields another empty buffer with the same channel count.
    pub fn blank_like(&self) -> PixelBuffer {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: vec![0; self.data.len()],
        }
    }

    /// Copy one channel plane into a new single-channel buffer.
    pub fn extract_channel(&self, channel: usize) -> BufferResult<PixelBuffer> {
        if channel >= self.channels {
            return Err(BufferError::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }
        Ok(Self {
            width: self.width,
            height: self.height,
            channels: 1,
            data: self
                .data
                .iter()
                .skip(channel)
                .step_by(self.channels)
                .copied()
                .collect(),
        })
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    /// Read a sample, failing with [`BufferError::OutOfRange`] outside bounds.
    pub fn at(&self, x: i64, y: i64, channel: usize) -> BufferResult<Sample> {
        let idx = self.checked_index(x, y, channel).ok_or_else(|| self.out_of_range(x, y, channel))?;
        Ok(self.data[idx])
    }

    /// Mutable access to a sample, failing with [`BufferError::OutOfRange`]
    /// outside bounds.
    pub fn at_mut(&mut self, x: i64, y: i64, channel: usize) -> BufferResult<&mut Sample> {
        let idx = self.checked_index(x, y, channel).ok_or_else(|| self.out_of_range(x, y, channel))?;
        Ok(&mut self.data[idx])
    }

    /// Read a sample, returning `None` outside bounds.
    pub fn get_pixel(&self, x: i64, y: i64, channel: usize) -> Option<Sample> {
        self.checked_index(x, y, channel).map(|idx| self.data[idx])
    }

    /// Write a sample. Writes outside bounds are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, channel: usize, value: Sample) {
        if let Some(idx) = self.checked_index(x, y, channel) {
            self.data[idx] = value;
        }
    }

    /// Whether `(x, y, channel)` addresses a sample in this buffer.
    pub fn contains(&self, x: i64, y: i64, channel: usize) -> bool {
        self.checked_index(x, y, channel).is_some()
    }

    /// Read an in-bounds sample without signed-coordinate checks.
    ///
    /// Panics if the coordinates are outside the buffer.
    #[inline]
    pub(crate) fn sample(&self, x: usize, y: usize, channel: usize) -> Sample {
        self.data[self.index(x, y, channel)]
    }

    #[inline]
    fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        (y * self.width + x) * self.channels + channel
    }

    fn checked_index(&self, x: i64, y: i64, channel: usize) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        (channel < self.channels).then(|| self.index(x, y, channel))
    }

    fn out_of_range(&self, x: i64, y: i64, channel: usize) -> BufferError {
        BufferError::OutOfRange {
            x,
            y,
            channel,
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    // ========================================================================
    // Whole-buffer operations
    // ========================================================================

    /// Set every sample to 0.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reallocate at a new size, keeping the channel count.
    ///
    /// Previous pixel content is discarded: the new storage is all zeros.
    pub fn resize(&mut self, new_width: usize, new_height: usize) -> BufferResult<()> {
        let len = sample_count(new_width, new_height, self.channels)?;
        self.width = new_width;
        self.height = new_height;
        self.data = vec![0; len];
        Ok(())
    }

    /// Replace every sample `s` with `f(s)`.
    pub fn apply_function<F>(&mut self, f: F)
    where
        F: Fn(Sample) -> Sample + Sync,
    {
        self.data.par_iter_mut().for_each(|s| *s = f(*s));
    }

    /// Stretch the sample range so the minimum maps to 0 and the maximum
    /// to 255. Does nothing for empty or constant buffers.
    pub fn normalize(&mut self) {
        let (Some(min), Some(max)) = (self.min_value(), self.max_value()) else {
            return;
        };
        if min == max {
            return;
        }

        let range = f64::from(max - min);
        self.apply_function(move |s| to_sample(f64::from(s - min) * 255.0 / range));
    }

    /// Convolve channel 0 with `kernel`.
    ///
    /// Each output sample is the weighted sum of its in-bounds neighbours
    /// divided by the in-bounds weight sum. Pixels whose in-bounds weight sum
    /// is not positive keep their value, as do all other channels. An empty
    /// kernel leaves the buffer untouched.
    pub fn apply_kernel(&mut self, kernel: &Kernel) {
        if kernel.is_empty() || self.is_empty() {
            return;
        }

        let row_len = self.width * self.channels;
        let mut output = self.data.clone();
        let source = &*self;

        output
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..source.width {
                    if let Some(value) = source.convolve_normalized(kernel, x, y, 0) {
                        row[x * source.channels] = to_sample(value);
                    }
                }
            });

        self.data = output;
    }

    /// Weighted average of `channel` around `(x, y)`, using only in-bounds
    /// neighbours. Returns `None` if their weights do not sum to a positive
    /// value.
    pub(crate) fn convolve_normalized(
        &self,
        kernel: &Kernel,
        x: usize,
        y: usize,
        channel: usize,
    ) -> Option<f64> {
        let half = kernel.half();
        let mut sum = 0.0;
        let mut weight_sum = 0.0;

        for ky in 0..kernel.size() {
            let Some(ny) = (y + ky).checked_sub(half).filter(|&ny| ny < self.height) else {
                continue;
            };
            for kx in 0..kernel.size() {
                let Some(nx) = (x + kx).checked_sub(half).filter(|&nx| nx < self.width) else {
                    continue;
                };
                let weight = kernel.get(kx, ky);
                sum += f64::from(self.sample(nx, ny, channel)) * weight;
                weight_sum += weight;
            }
        }

        (weight_sum > 0.0).then(|| sum / weight_sum)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Smallest sample, or `None` if the buffer is empty.
    pub fn min_value(&self) -> Option<Sample> {
        self.data.iter().copied().min()
    }

    /// Largest sample, or `None` if the buffer is empty.
    pub fn max_value(&self) -> Option<Sample> {
        self.data.iter().copied().max()
    }

    /// Arithmetic mean of all samples, 0.0 for an empty buffer.
    pub fn mean_value(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let total: u64 = self.data.iter().map(|&s| u64::from(s)).sum();
        total as f64 / self.data.len() as f64
    }

    /// Population standard deviation of all samples, 0.0 for an empty buffer.
    pub fn standard_deviation(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mean = self.mean_value();
        let squared: f64 = self
            .data
            .iter()
            .map(|&s| {
                let diff = f64::from(s) - mean;
                diff * diff
            })
            .sum();
        (squared / self.data.len() as f64).sqrt()
    }

    /// Count of each sample value across all channels.
    pub fn histogram(&self) -> [usize; SAMPLE_LEVELS] {
        let mut hist = [0usize; SAMPLE_LEVELS];
        for &s in &self.data {
            hist[usize::from(s)] += 1;
        }
        hist
    }
}

fn sample_count(width: usize, height: usize, channels: usize) -> BufferResult<usize> {
    let invalid = || BufferError::InvalidDimension {
        width,
        height,
        channels,
    };
    if width == 0 || height == 0 || channels == 0 {
        return Err(invalid());
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use proptest::prelude::*;

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, 1, |x, y, _| (x * 10 + y) as u8).unwrap()
    }

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buffer = PixelBuffer::new(100, 100, 1).unwrap();
        assert_eq!(buffer.width(), 100);
        assert_eq!(buffer.height(), 100);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.len(), 10_000);
        assert!(!buffer.is_empty());
        assert!(buffer.as_slice().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        for (w, h, c) in [(0, 5, 1), (5, 0, 1), (5, 5, 0)] {
            let err = PixelBuffer::new(w, h, c).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDimension);
        }
    }

    #[test]
    fn test_default_is_empty() {
        let buffer = PixelBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.size(), (0, 0));
        assert_eq!(buffer.min_value(), None);
        assert_eq!(buffer.max_value(), None);
        assert_eq!(buffer.mean_value(), 0.0);
        assert_eq!(buffer.standard_deviation(), 0.0);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 2, 1, vec![1, 2, 3, 4]).is_ok());
        let err = PixelBuffer::from_raw(2, 2, 1, vec![1, 2, 3]).unwrap_err();
        assert_eq!(err, BufferError::SampleCountMismatch { expected: 4, actual: 3 });
    }

    #[test]
    fn test_pixel_access() {
        let mut buffer = PixelBuffer::new(100, 100, 1).unwrap();
        *buffer.at_mut(50, 50, 0).unwrap() = 255;
        assert_eq!(buffer.at(50, 50, 0).unwrap(), 255);
        assert_eq!(buffer.as_slice()[50 * 100 + 50], 255);
    }

    #[test]
    fn test_interleaved_addressing() {
        let mut buffer = PixelBuffer::new(4, 3, 3).unwrap();
        buffer.set_pixel(2, 1, 2, 77);
        assert_eq!(buffer.as_slice()[(4 + 2) * 3 + 2], 77);
        assert_eq!(buffer.get_pixel(2, 1, 2), Some(77));
        assert_eq!(buffer.get_pixel(2, 1, 1), Some(0));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut buffer = PixelBuffer::new(4, 4, 1).unwrap();
        for (x, y, c) in [(-1, 0, 0), (0, -1, 0), (4, 0, 0), (0, 4, 0), (0, 0, 1)] {
            assert_eq!(buffer.at(x, y, c).unwrap_err().kind(), ErrorKind::OutOfRange);
            assert!(buffer.at_mut(x, y, c).is_err());
            assert_eq!(buffer.get_pixel(x, y, c), None);
            assert!(!buffer.contains(x, y, c));
        }

        let before = buffer.clone();
        buffer.set_pixel(-1, 2, 0, 9);
        buffer.set_pixel(2, 9, 0, 9);
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = PixelBuffer::new(10, 10, 1).unwrap();
        original.set_pixel(5, 5, 0, 200);
        let mut copy = original.clone();
        copy.set_pixel(5, 5, 0, 10);
        assert_eq!(original.get_pixel(5, 5, 0), Some(200));
        assert_eq!(copy.get_pixel(5, 5, 0), Some(10));
    }

    #[test]
    fn test_take_leaves_source_empty() {
        let mut source = PixelBuffer::new(3, 3, 2).unwrap();
        source.set_pixel(1, 1, 1, 42);
        let moved = source.take();
        assert!(source.is_empty());
        assert_eq!(source.size(), (0, 0));
        assert_eq!(moved.get_pixel(1, 1, 1), Some(42));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut buffer = gradient(10, 10);
        buffer.clear();
        assert_eq!(buffer.max_value(), Some(0));

        let mut buffer = PixelBuffer::from_fn(4, 4, 2, |_, _, _| 9).unwrap();
        buffer.resize(6, 2).unwrap();
        assert_eq!(buffer.size(), (6, 2));
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.len(), 24);
        assert!(buffer.as_slice().iter().all(|&s| s == 0));

        let err = buffer.resize(0, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimension);
        assert_eq!(buffer.size(), (6, 2));
    }

    #[test]
    fn test_statistics() {
        let buffer = PixelBuffer::from_raw(2, 2, 1, vec![2, 4, 4, 6]).unwrap();
        assert_eq!(buffer.min_value(), Some(2));
        assert_eq!(buffer.max_value(), Some(6));
        assert!((buffer.mean_value() - 4.0).abs() < 1e-12);
        assert!((buffer.standard_deviation() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        let buffer = PixelBuffer::from_raw(3, 1, 2, vec![0, 0, 5, 255, 5, 5]).unwrap();
        let hist = buffer.histogram();
        assert_eq!(hist[0], 2);
        assert_eq!(hist[5], 3);
        assert_eq!(hist[255], 1);
        assert_eq!(hist.iter().sum::<usize>(), buffer.len());
    }

    #[test]
    fn test_normalize_stretches_range() {
        let mut buffer = PixelBuffer::from_raw(3, 1, 1, vec![50, 100, 150]).unwrap();
        buffer.normalize();
        assert_eq!(buffer.as_slice(), &[0, 128, 255]);
    }

    #[test]
    fn test_normalize_rounds_halves_up() {
        let mut buffer = PixelBuffer::from_raw(3, 1, 1, vec![0, 1, 2]).unwrap();
        buffer.normalize();
        assert_eq!(buffer.as_slice(), &[0, 128, 255]);

        let mut buffer = PixelBuffer::from_raw(5, 1, 1, vec![10, 12, 14, 16, 18]).unwrap();
        buffer.normalize();
        assert_eq!(buffer.as_slice(), &[0, 64, 128, 191, 255]);
    }

    #[test]
    fn test_sample_count_overflow_is_rejected() {
        let err = PixelBuffer::new(usize::MAX, 2, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimension);
        assert!(PixelBuffer::from_raw(usize::MAX / 2 + 1, 1, 2, Vec::new()).is_err());

        let mut buffer = PixelBuffer::grayscale(4, 4).unwrap();
        let err = buffer.resize(usize::MAX, usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimension);
        assert_eq!(buffer.size(), (4, 4));
        assert_eq!(buffer.len(), 16);
    }

    #[test]
    fn test_normalize_constant_is_noop() {
        let mut buffer = PixelBuffer::from_fn(5, 5, 1, |_, _, _| 77).unwrap();
        let before = buffer.clone();
        buffer.normalize();
        assert_eq!(buffer, before);

        let mut empty = PixelBuffer::default();
        empty.normalize();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_apply_function() {
        let mut buffer = PixelBuffer::from_raw(2, 1, 1, vec![10, 250]).unwrap();
        buffer.apply_function(|s| s.saturating_add(10));
        assert_eq!(buffer.as_slice(), &[20, 255]);
    }

    #[test]
    fn test_apply_kernel_box_average_renormalizes_edges() {
        let mut buffer = PixelBuffer::from_raw(3, 1, 1, vec![0, 90, 180]).unwrap();
        let kernel = Kernel::new(3, vec![1.0; 9]).unwrap();
        buffer.apply_kernel(&kernel);
        // Corner pixels only see two in-bounds neighbours in a 3x1 image.
        assert_eq!(buffer.as_slice(), &[45, 90, 135]);
    }

    #[test]
    fn test_apply_kernel_touches_channel_zero_only() {
        let mut buffer = PixelBuffer::from_fn(3, 3, 2, |x, _, c| if c == 0 { (x * 100) as u8 } else { 7 }).unwrap();
        let kernel = Kernel::new(3, vec![1.0; 9]).unwrap();
        buffer.apply_kernel(&kernel);
        assert_eq!(buffer.get_pixel(1, 1, 0), Some(100));
        assert_eq!(buffer.get_pixel(0, 1, 0), Some(50));
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(buffer.get_pixel(x, y, 1), Some(7));
            }
        }
    }

    #[test]
    fn test_apply_kernel_empty_is_noop() {
        let mut buffer = gradient(4, 4);
        let before = buffer.clone();
        buffer.apply_kernel(&Kernel::default());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_apply_kernel_zero_weight_sum_keeps_value() {
        let mut buffer = gradient(5, 5);
        let before = buffer.clone();
        buffer.apply_kernel(&Kernel::sobel_x());
        // Interior weight sums are 0, so nothing is written.
        assert_eq!(buffer.get_pixel(2, 2, 0), before.get_pixel(2, 2, 0));
    }

    #[test]
    fn test_extract_channel() {
        let buffer = PixelBuffer::from_fn(2, 2, 3, |x, y, c| (x + 2 * y + 10 * c) as u8).unwrap();
        let green = buffer.extract_channel(1).unwrap();
        assert_eq!(green.channels(), 1);
        assert_eq!(green.as_slice(), &[10, 11, 12, 13]);
        assert!(buffer.extract_channel(3).is_err());
    }

    proptest! {
        #[test]
        fn prop_histogram_sums_to_len(data in proptest::collection::vec(any::<u8>(), 1..200)) {
            let len = data.len();
            let buffer = PixelBuffer::from_raw(len, 1, 1, data).unwrap();
            prop_assert_eq!(buffer.histogram().iter().sum::<usize>(), len);
        }

        #[test]
        fn prop_normalize_spans_full_range(data in proptest::collection::vec(any::<u8>(), 2..200)) {
            let mut buffer = PixelBuffer::from_raw(data.len(), 1, 1, data).unwrap();
            let distinct = buffer.min_value() != buffer.max_value();
            buffer.normalize();
            if distinct {
                prop_assert_eq!(buffer.min_value(), Some(0));
                prop_assert_eq!(buffer.max_value(), Some(255));
            }
        }
    }
}
