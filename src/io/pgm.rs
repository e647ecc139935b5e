//! Binary PGM (`P5`) reading and writing.
//!
//! Layout: the magic `P5`, then width, height and max value as whitespace
//! separated decimal tokens (`#` comments allowed between them), a single
//! whitespace byte, then `width * height` 8-bit samples in row-major order.

use crate::core::buffer::PixelBuffer;
use crate::core::error::RasterIoError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic token of the binary graymap variant.
pub const MAGIC: &str = "P5";

/// Largest max value representable with one byte per sample.
pub const MAX_VALUE: u32 = 255;

// ============================================================================
// Decoding
// ============================================================================

/// Cursor over the raw header bytes.
struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Option<&'a str> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).ok()
    }

    fn number(&mut self, field: &str) -> Result<u32, RasterIoError> {
        let token = self
            .token()
            .ok_or_else(|| RasterIoError::InvalidHeader(format!("missing {}", field)))?;
        token
            .parse::<u32>()
            .map_err(|_| RasterIoError::InvalidHeader(format!("{} '{}' is not a number", field, token)))
    }
}

/// Decode a PGM image from a reader.
///
/// Bytes after the last sample are ignored.
pub fn decode<R: Read>(mut reader: R) -> Result<PixelBuffer, RasterIoError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut header = HeaderReader::new(&bytes);
    let magic = header.token().unwrap_or_default();
    if magic != MAGIC {
        return Err(RasterIoError::BadMagic(magic.to_string()));
    }

    let width = header.number("width")? as usize;
    let height = header.number("height")? as usize;
    let max_value = header.number("max value")?;

    if width == 0 || height == 0 {
        return Err(RasterIoError::InvalidHeader(format!(
            "dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if max_value == 0 || max_value > MAX_VALUE {
        return Err(RasterIoError::InvalidHeader(format!(
            "max value {} outside 1..={}",
            max_value, MAX_VALUE
        )));
    }

    // Exactly one whitespace byte separates the header from the samples.
    match bytes.get(header.pos) {
        Some(b) if b.is_ascii_whitespace() => header.pos += 1,
        _ => {
            return Err(RasterIoError::InvalidHeader(
                "missing separator before sample data".to_string(),
            ))
        }
    }

    let expected = width * height;
    let data = &bytes[header.pos..];
    if data.len() < expected {
        return Err(RasterIoError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    Ok(PixelBuffer::from_raw(width, height, 1, data[..expected].to_vec())?)
}

/// Read a PGM file, reporting the precise failure.
pub fn try_load(path: impl AsRef<Path>) -> Result<PixelBuffer, RasterIoError> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

/// Read a PGM file. Returns `None` on any failure; the cause is logged.
pub fn load(path: impl AsRef<Path>) -> Option<PixelBuffer> {
    let path = path.as_ref();
    match try_load(path) {
        Ok(buffer) => {
            log::debug!(
                "loaded {} ({}x{})",
                path.display(),
                buffer.width(),
                buffer.height()
            );
            Some(buffer)
        }
        Err(e) => {
            log::warn!("failed to load {}: {}", path.display(), e);
            None
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a single-channel buffer as PGM.
pub fn encode<W: Write>(buffer: &PixelBuffer, mut writer: W) -> Result<(), RasterIoError> {
    if buffer.channels() != 1 {
        return Err(RasterIoError::UnsupportedChannels(buffer.channels()));
    }
    write!(
        writer,
        "{}\n{} {}\n{}\n",
        MAGIC,
        buffer.width(),
        buffer.height(),
        MAX_VALUE
    )?;
    writer.write_all(buffer.as_slice())?;
    writer.flush()?;
    Ok(())
}

/// Write a PGM file, reporting the precise failure.
///
/// Nothing is created when the buffer has more than one channel.
pub fn try_save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<(), RasterIoError> {
    if buffer.channels() != 1 {
        return Err(RasterIoError::UnsupportedChannels(buffer.channels()));
    }
    let file = File::create(path.as_ref())?;
    encode(buffer, BufWriter::new(file))
}

/// Write a PGM file. Returns whether it succeeded; the cause is logged.
pub fn save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match try_save(buffer, path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("failed to save {}: {}", path.display(), e);
            false
        }
    }
}
