//! Bridge to the `image` crate for formats other than PGM.
//!
//! Everything here works on channel 0: decoded images are converted to 8-bit
//! luma, and buffers are exported as grayscale.

use crate::core::buffer::PixelBuffer;
use crate::core::error::RasterIoError;
use image::{GrayImage, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Default JPEG quality used by the command line.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Decode any format the `image` crate understands into a single-channel
/// buffer.
pub fn try_load_grayscale(path: impl AsRef<Path>) -> Result<PixelBuffer, RasterIoError> {
    let luma = image::open(path.as_ref())?.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(PixelBuffer::from_raw(
        width as usize,
        height as usize,
        1,
        luma.into_raw(),
    )?)
}

/// Decode an image as grayscale. Returns `None` on failure; the cause is
/// logged.
pub fn load_grayscale(path: impl AsRef<Path>) -> Option<PixelBuffer> {
    let path = path.as_ref();
    match try_load_grayscale(path) {
        Ok(buffer) => Some(buffer),
        Err(e) => {
            log::warn!("failed to decode {}: {}", path.display(), e);
            None
        }
    }
}

/// Channel 0 as an 8-bit luma image.
pub fn to_gray_image(buffer: &PixelBuffer) -> GrayImage {
    let gray = if buffer.channels() == 1 {
        buffer.as_slice().to_vec()
    } else {
        buffer
            .as_slice()
            .chunks_exact(buffer.channels())
            .map(|pixel| pixel[0])
            .collect()
    };
    // Dimensions and sample count always agree for a valid buffer.
    GrayImage::from_raw(buffer.width() as u32, buffer.height() as u32, gray).unwrap_or_default()
}

/// Channel 0 replicated into R, G and B, the layout display surfaces expect.
pub fn to_rgb_image(buffer: &PixelBuffer) -> RgbImage {
    let channels = buffer.channels();
    let rgb: Vec<u8> = buffer
        .as_slice()
        .chunks_exact(channels.max(1))
        .flat_map(|pixel| [pixel[0]; 3])
        .collect();
    RgbImage::from_raw(buffer.width() as u32, buffer.height() as u32, rgb).unwrap_or_default()
}

/// Encode channel 0 as a grayscale JPEG, reporting the precise failure.
pub fn try_save_jpeg(buffer: &PixelBuffer, path: impl AsRef<Path>, quality: u8) -> Result<(), RasterIoError> {
    let gray = to_gray_image(buffer);
    let mut output = BufWriter::new(File::create(path.as_ref())?);
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    encoder.encode(&gray, gray.width(), gray.height(), image::ExtendedColorType::L8)?;
    Ok(())
}

/// Encode channel 0 as a grayscale JPEG. Returns whether it succeeded.
pub fn save_jpeg(buffer: &PixelBuffer, path: impl AsRef<Path>, quality: u8) -> bool {
    let path = path.as_ref();
    match try_save_jpeg(buffer, path, quality) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("failed to save {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PixelBuffer {
        PixelBuffer::from_fn(32, 24, 1, |x, y, _| if (8..24).contains(&x) && (8..16).contains(&y) { 255 } else { 0 }).unwrap()
    }

    #[test]
    fn test_rgb_replicates_channel_zero() {
        let buffer = PixelBuffer::from_fn(2, 1, 2, |x, _, c| if c == 0 { (x * 100) as u8 } else { 7 }).unwrap();
        let rgb = to_rgb_image(&buffer);
        assert_eq!(rgb.dimensions(), (2, 1));
        assert_eq!(rgb.get_pixel(1, 0).0, [100, 100, 100]);
    }

    #[test]
    fn test_gray_image_uses_channel_zero() {
        let buffer = PixelBuffer::from_fn(3, 2, 3, |x, y, c| (x + y * 3 + c * 50) as u8).unwrap();
        let gray = to_gray_image(&buffer);
        assert_eq!(gray.get_pixel(2, 1).0, [5]);
    }

    #[test]
    fn test_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        let buffer = square();
        to_gray_image(&buffer).save(&path).unwrap();

        let loaded = load_grayscale(&path).unwrap();
        assert_eq!(loaded, buffer);
    }

    #[test]
    fn test_save_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.jpg");
        assert!(save_jpeg(&square(), &path, DEFAULT_JPEG_QUALITY));

        let loaded = load_grayscale(&path).unwrap();
        assert_eq!(loaded.size(), (32, 24));
        assert_eq!(loaded.channels(), 1);
    }

    #[test]
    fn test_failures_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_grayscale(dir.path().join("missing.png")).is_none());
        assert!(!save_jpeg(&square(), dir.path().join("no_dir").join("x.jpg"), 80));
    }
}
