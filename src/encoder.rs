//! Single-stream message embedding.
//!
//! This module orchestrates the encoding side of the LSB1 protocol:
//! 1. Base64 the UTF-8 message
//! 2. Wrap it in an LSB1 frame (or append the legacy null terminator)
//! 3. Convert to bits, MSB-first
//! 4. Embed interleaved across the R, G and B channels of every pixel
//!
//! Capacity is checked before any pixel is touched; a failed encode never
//! produces a half-written image.

use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

use crate::bits::bytes_to_bits_msb;
use crate::carrier::{check_bit_depth, CarrierError, PixelGrid};
use crate::lsb1::build_frame;

/// Errors that can occur during encoding.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Empty message")]
    EmptyMessage,

    #[error(transparent)]
    Carrier(#[from] CarrierError),
}

/// Which single-stream payload format to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// The framed LSB1 protocol (header, length, optional CRC32).
    #[default]
    Framed,
    /// The pre-protocol format: bare base64 followed by a null byte.
    Legacy,
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Framed => write!(f, "lsb1"),
            PayloadFormat::Legacy => write!(f, "legacy"),
        }
    }
}

/// Configuration for the encoder.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Whether the frame carries a CRC32 over its payload. Ignored for the
    /// legacy format, which has no checksum.
    pub use_crc: bool,
    /// Payload format to write.
    pub format: PayloadFormat,
    /// Low bits used per pixel channel (1 or 4).
    pub bits_per_channel: u8,
    /// Whether to output verbose information.
    pub verbose: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            use_crc: true,
            format: PayloadFormat::Framed,
            bits_per_channel: 1,
            verbose: false,
        }
    }
}

/// Result of an encode.
#[derive(Debug, Clone)]
pub struct EncodeSummary {
    /// Length of the (base64) payload in bytes.
    pub payload_length: u32,
    /// CRC32 of the payload, when one was written.
    pub crc32: Option<u32>,
    /// Bits actually embedded into the carrier.
    pub total_embedded_bits: u64,
    /// Format that was written.
    pub format: PayloadFormat,
}

/// Bytes of payload an image of the given size can carry in the
/// single-stream protocol (three interleaved channels per pixel).
pub fn calculate_capacity(width: u32, height: u32, bits_per_channel: u8) -> u64 {
    (width as u64) * (height as u64) * 3 * (bits_per_channel as u64) / 8
}

/// Encodes `message` into the cover image at `cover_path` and writes the
/// stego image to `out_path`.
pub fn encode_message<P: AsRef<Path>>(
    cover_path: P,
    message: &str,
    out_path: P,
    options: &EncodeOptions,
) -> Result<EncodeSummary, EncodeError> {
    let mut grid = PixelGrid::from_file(cover_path)?;
    let summary = encode_into_grid(&mut grid, message, options)?;
    grid.save(out_path)?;
    Ok(summary)
}

/// Encodes `message` into an in-memory grid.
pub fn encode_into_grid(
    grid: &mut PixelGrid,
    message: &str,
    options: &EncodeOptions,
) -> Result<EncodeSummary, EncodeError> {
    if message.is_empty() {
        return Err(EncodeError::EmptyMessage);
    }
    check_bit_depth(options.bits_per_channel)?;

    let payload = BASE64.encode(message.as_bytes()).into_bytes();
    let (stream, crc32) = match options.format {
        PayloadFormat::Framed => {
            let crc = options.use_crc.then(|| crc32fast::hash(&payload));
            (build_frame(&payload, options.use_crc), crc)
        }
        PayloadFormat::Legacy => {
            let mut stream = payload.clone();
            stream.push(0);
            (stream, None)
        }
    };

    let bits = bytes_to_bits_msb(&stream);
    if options.verbose {
        eprintln!(
            "Embedding {} bits ({} payload bytes, {} format) into {}x{} carrier",
            bits.len(),
            payload.len(),
            options.format,
            grid.width(),
            grid.height()
        );
    }

    grid.write_interleaved(options.bits_per_channel, &bits)?;

    Ok(EncodeSummary {
        payload_length: payload.len() as u32,
        crc32,
        total_embedded_bits: bits.len() as u64,
        format: options.format,
    })
}
