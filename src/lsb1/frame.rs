//! The LSB1 frame: the single-stream wire format.
//!
//! Layout (big-endian throughout):
//!
//! ```text
//! [4 bytes] magic "LSB1"
//! [1 byte ] version (currently 1)
//! [1 byte ] flags (bit0 = CRC32 present)
//! [4 bytes] payload length
//! [4 bytes] CRC32 of the payload (only when the flag is set)
//! [N bytes] payload (base64 ASCII of the UTF-8 message, by call-site
//!           convention; the frame itself is payload-agnostic)
//! ```
//!
//! Header size is 10 bytes without CRC, 14 with. The CRC check is the
//! corruption-detection primitive the rest of the system depends on: a
//! mismatch always surfaces as an error, never as silently returned bytes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

use super::legacy::is_base64_byte;

/// Frame magic.
pub const MAGIC: [u8; 4] = *b"LSB1";

/// Current protocol version.
pub const VERSION: u8 = 1;

/// Flags bit 0: a CRC32 field follows the payload length.
pub const FLAG_CRC: u8 = 0b0000_0001;

/// Header length without the CRC field.
pub const BASE_HEADER_LEN: usize = 10;

/// Header length with the CRC field.
pub const CRC_HEADER_LEN: usize = 14;

/// Errors from frame construction and parsing.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Truncated header: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },

    #[error("Bad magic {0:?}: not an LSB1 frame")]
    BadMagic([u8; 4]),

    #[error("Truncated payload: header declares {declared} bytes, {available} remain")]
    TruncatedPayload { declared: usize, available: usize },

    #[error("CRC mismatch: frame says {expected:08X}, payload hashes to {computed:08X}")]
    CrcMismatch { expected: u32, computed: u32 },

    #[error("Non-base64 byte 0x{byte:02X} at payload offset {offset}")]
    NonAsciiPayload { offset: usize, byte: u8 },

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Decoded payload is not valid UTF-8: {0}")]
    Utf8DecodeError(#[from] std::string::FromUtf8Error),
}

/// Parsed LSB1 frame header. Reconstructed on decode, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub flags: u8,
    pub payload_length: u32,
    pub crc32: Option<u32>,
}

impl FrameHeader {
    pub fn has_crc(&self) -> bool {
        self.flags & FLAG_CRC != 0
    }

    /// Header length in bytes for these flags.
    pub fn header_len(&self) -> usize {
        if self.has_crc() {
            CRC_HEADER_LEN
        } else {
            BASE_HEADER_LEN
        }
    }
}

/// A successfully parsed frame: header, payload slice, and the cursor one
/// past the payload's end.
#[derive(Debug)]
pub struct ParsedFrame<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
    pub cursor: usize,
}

/// Builds the byte form of a frame around `payload`.
pub fn build_frame(payload: &[u8], with_crc: bool) -> Vec<u8> {
    let header_len = if with_crc { CRC_HEADER_LEN } else { BASE_HEADER_LEN };
    let mut frame = Vec::with_capacity(header_len + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(VERSION);
    frame.push(if with_crc { FLAG_CRC } else { 0 });
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    if with_crc {
        frame.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
    }
    frame.extend_from_slice(payload);
    frame
}

/// Parses and validates a frame from the start of `data`.
///
/// Bytes past the payload are ignored: the carrier always yields more
/// bitstream than the frame occupies.
pub fn parse_frame(data: &[u8]) -> Result<ParsedFrame<'_>, FrameError> {
    if data.len() < BASE_HEADER_LEN {
        return Err(FrameError::TruncatedHeader {
            needed: BASE_HEADER_LEN,
            available: data.len(),
        });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&data[0..4]);
    if magic != MAGIC {
        return Err(FrameError::BadMagic(magic));
    }

    let version = data[4];
    let flags = data[5];
    let has_crc = flags & FLAG_CRC != 0;

    if has_crc && data.len() < CRC_HEADER_LEN {
        return Err(FrameError::TruncatedHeader {
            needed: CRC_HEADER_LEN,
            available: data.len(),
        });
    }

    let payload_length = u32::from_be_bytes([data[6], data[7], data[8], data[9]]);
    let (crc32, header_len) = if has_crc {
        let crc = u32::from_be_bytes([data[10], data[11], data[12], data[13]]);
        (Some(crc), CRC_HEADER_LEN)
    } else {
        (None, BASE_HEADER_LEN)
    };

    let declared = payload_length as usize;
    let available = data.len() - header_len;
    if declared > available {
        return Err(FrameError::TruncatedPayload {
            declared,
            available,
        });
    }

    let payload = &data[header_len..header_len + declared];
    if let Some(expected) = crc32 {
        let computed = crc32fast::hash(payload);
        if computed != expected {
            return Err(FrameError::CrcMismatch { expected, computed });
        }
    }

    Ok(ParsedFrame {
        header: FrameHeader {
            version,
            flags,
            payload_length,
            crc32,
        },
        payload,
        cursor: header_len + declared,
    })
}

/// Decodes a base64 payload into the original UTF-8 text.
///
/// The alphabet is checked byte-by-byte first so a corrupted payload
/// reports the offending offset rather than a generic decode failure.
pub fn decode_base64_payload(payload: &[u8]) -> Result<String, FrameError> {
    for (offset, &byte) in payload.iter().enumerate() {
        if !is_base64_byte(byte) {
            return Err(FrameError::NonAsciiPayload { offset, byte });
        }
    }
    let decoded = BASE64
        .decode(payload)
        .map_err(|e| FrameError::InvalidBase64(e.to_string()))?;
    Ok(String::from_utf8(decoded)?)
}
