//! # Pixelveil - hide structured data in plain sight
//!
//! Pixelveil embeds structured data in the least-significant bits of PNG
//! raster images and recovers it byte-exact, detecting corruption along the
//! way and — for single-channel damage — healing it from a parity sidecar.
//!
//! ## Protocols
//!
//! Three layers share one bit-level substrate:
//!
//! - **Bitstream substrate**: a deterministic mapping between byte
//!   sequences and pixel-channel LSBs (row-major, MSB-first).
//! - **LSB1**: a single framed stream (magic, version, flags, length,
//!   optional CRC32, base64 payload) interleaved across all three color
//!   channels, plus a legacy fallback for pre-protocol images.
//! - **MRP** (Multi-channel Resonance Protocol): three independent frames,
//!   one per color channel — red carries the message, green the metadata,
//!   blue a parity sidecar. If exactly one data channel fails its CRC, the
//!   sidecar rebuilds it.
//!
//! ## Example
//!
//! ```rust
//! use pixelveil::carrier::{create_cover_image, CoverStyle};
//! use pixelveil::decoder::{extract_from_grid, DecodeOptions};
//! use pixelveil::encoder::{encode_into_grid, EncodeOptions};
//!
//! let mut grid = create_cover_image(64, 64, CoverStyle::Noise);
//! encode_into_grid(&mut grid, "meet at dawn", &EncodeOptions::default()).unwrap();
//!
//! let extracted = extract_from_grid(&grid, &DecodeOptions::default()).unwrap();
//! assert_eq!(extracted.message, "meet at dawn");
//! ```
//!
//! ## Integrity model
//!
//! The payload is obfuscated, not secret: there is no encryption here.
//! What the codec does guarantee is that corrupted data never masquerades
//! as intact data — every CRC failure surfaces, and MRP decode reports
//! exactly one of `ok`, `degraded`, `recovered`, or `unrecoverable`.
//!
//! ## Modules
//!
//! - [`bits`]: byte/bit conversion, MSB-first
//! - [`carrier`]: pixel grids, channel addressing, synthetic covers
//! - [`lsb1`]: the single-stream frame codec and legacy extractor
//! - [`encoder`] / [`decoder`]: the single-stream facade
//! - [`mrp`]: the three-channel protocol with parity recovery

pub mod bits;
pub mod carrier;
pub mod commands;
pub mod decoder;
pub mod encoder;
pub mod lsb1;
pub mod mrp;

// Re-export commonly used types at the crate root
pub use carrier::{create_cover_image, CarrierError, Channel, CoverStyle, PixelGrid};
pub use decoder::{extract_from_grid, extract_from_image, DecodeError, DecodeOptions, ExtractedMessage};
pub use encoder::{
    calculate_capacity, encode_into_grid, encode_message, EncodeError, EncodeOptions,
    EncodeSummary, PayloadFormat,
};
pub use mrp::{
    decode_mrp, decode_mrp_from_grid, encode_mrp, encode_mrp_into_grid, verify_frames,
    IntegrityReport, IntegrityStatus, MrpDecoded, MrpError, MrpOptions,
};
