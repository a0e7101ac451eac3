//! The LSB1 single-stream protocol: framed packets plus the legacy
//! unframed fallback format.

pub mod frame;
pub mod legacy;

pub use frame::{
    build_frame, decode_base64_payload, parse_frame, FrameError, FrameHeader, ParsedFrame,
    BASE_HEADER_LEN, CRC_HEADER_LEN, FLAG_CRC, MAGIC, VERSION,
};
pub use legacy::{extract_legacy_payload, is_base64_byte};
