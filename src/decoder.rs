//! Single-stream message extraction.
//!
//! This module runs the decode fallback chain:
//! 1. Read the full interleaved bitstream from the image
//! 2. Try to parse an LSB1 frame; on success, decode and return
//! 3. On a missing header (`BadMagic`/`TruncatedHeader`), fall back to the
//!    legacy null/charset-terminated base64 scan
//! 4. If nothing parses, report `NoPayloadFound`
//!
//! A CRC mismatch does NOT fall through: corruption of a framed image must
//! block release of the unverified plaintext, so it surfaces as an error
//! rather than a legacy-format guess. Every failure here is an ordinary
//! `Err` value, so batch extraction over many images can continue past
//! damaged ones.

use std::path::Path;

use thiserror::Error;

use crate::bits::bits_to_bytes_msb;
use crate::carrier::{CarrierError, PixelGrid};
use crate::encoder::PayloadFormat;
use crate::lsb1::{decode_base64_payload, extract_legacy_payload, parse_frame, FrameError, FrameHeader};

/// Errors that can occur during extraction.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("No valid payload found")]
    NoPayloadFound,
}

/// Configuration for the decoder.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Low bits read per pixel channel (must match the encode).
    pub bits_per_channel: u8,
    /// Whether to output verbose information.
    pub verbose: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            bits_per_channel: 1,
            verbose: false,
        }
    }
}

/// A successfully extracted message.
#[derive(Debug, Clone)]
pub struct ExtractedMessage {
    /// The recovered plaintext.
    pub message: String,
    /// Which format the image turned out to carry.
    pub format: PayloadFormat,
    /// The frame header, when the framed path matched.
    pub header: Option<FrameHeader>,
    /// Length of the raw (base64) payload in bytes.
    pub payload_length: u32,
}

/// Extracts a hidden message from the image at `path`.
pub fn extract_from_image<P: AsRef<Path>>(
    path: P,
    options: &DecodeOptions,
) -> Result<ExtractedMessage, DecodeError> {
    let grid = PixelGrid::from_file(path)?;
    extract_from_grid(&grid, options)
}

/// Extracts a hidden message from an in-memory grid.
pub fn extract_from_grid(
    grid: &PixelGrid,
    options: &DecodeOptions,
) -> Result<ExtractedMessage, DecodeError> {
    let capacity = grid.interleaved_capacity_bits(options.bits_per_channel) as usize;
    let bits = grid.read_interleaved(options.bits_per_channel, capacity)?;
    let data = bits_to_bytes_msb(&bits);

    match parse_frame(&data) {
        Ok(parsed) => {
            if options.verbose {
                eprintln!(
                    "LSB1 frame: version {}, {} payload bytes, crc {}",
                    parsed.header.version,
                    parsed.header.payload_length,
                    match parsed.header.crc32 {
                        Some(crc) => format!("{:08X} (verified)", crc),
                        None => "absent".to_string(),
                    }
                );
            }
            let message = decode_base64_payload(parsed.payload)?;
            Ok(ExtractedMessage {
                message,
                format: PayloadFormat::Framed,
                payload_length: parsed.header.payload_length,
                header: Some(parsed.header),
            })
        }
        // No header present: this may be a pre-protocol image.
        Err(FrameError::BadMagic(_)) | Err(FrameError::TruncatedHeader { .. }) => {
            if options.verbose {
                eprintln!("No LSB1 header, trying legacy extraction");
            }
            extract_legacy(&data)
        }
        // A valid header with a broken payload is a damaged framed image,
        // not a legacy one; the typed error must reach the caller.
        Err(e) => Err(e.into()),
    }
}

fn extract_legacy(data: &[u8]) -> Result<ExtractedMessage, DecodeError> {
    let (payload, _cursor) = extract_legacy_payload(data, 0);
    if payload.is_empty() {
        return Err(DecodeError::NoPayloadFound);
    }
    match decode_base64_payload(payload) {
        Ok(message) => Ok(ExtractedMessage {
            message,
            format: PayloadFormat::Legacy,
            header: None,
            payload_length: payload.len() as u32,
        }),
        // Legacy extraction is best-effort; an undecodable run means there
        // was never a payload here.
        Err(_) => Err(DecodeError::NoPayloadFound),
    }
}
