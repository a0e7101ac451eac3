//! The MRP frame envelope.
//!
//! Unlike the packed-binary LSB1 header, a per-channel MRP frame is a small
//! JSON document:
//!
//! ```json
//! {"magic":"MRP1","channel":"R","flags":1,"length":20,
//!  "crc32":"6E3FD9B7","payload_b64":"..."}
//! ```
//!
//! That trades wire density for easy diagnosis: a damaged channel can be
//! dumped and inspected with any JSON tool. `length` counts the decoded
//! payload bytes; `crc32` is eight hex characters (written uppercase, parsed
//! case-insensitively) over the decoded payload.
//!
//! Structural parsing and payload verification are separate steps: the
//! decoder keeps a checksum-failed frame around because its declared length
//! still drives parity recovery.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::carrier::Channel;

/// Frame magic.
pub const MRP_MAGIC: &str = "MRP1";

/// Flags bit 0: a crc32 field is present.
pub const MRP_FLAG_CRC: u8 = 0b0000_0001;

/// Errors from MRP frame construction and parsing.
#[derive(Error, Debug)]
pub enum MrpFrameError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Bad magic '{0}': not an MRP1 frame")]
    BadMagic(String),

    #[error("Bad channel id '{0}': expected R, G, or B")]
    BadChannel(String),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Length mismatch: header declares {declared} bytes, payload decodes to {actual}")]
    LengthMismatch { declared: u32, actual: u32 },

    #[error("CRC flag set but no crc32 field present")]
    MissingCrc,

    #[error("Unparseable crc32 field '{0}'")]
    BadCrcEncoding(String),

    #[error("CRC mismatch: frame says {expected:08X}, payload hashes to {computed:08X}")]
    CrcMismatch { expected: u32, computed: u32 },
}

/// JSON shape of the frame as it travels through a channel.
#[derive(Serialize, Deserialize)]
struct WireFrame {
    magic: String,
    channel: String,
    flags: u8,
    length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crc32: Option<String>,
    payload_b64: String,
}

/// A structurally valid MRP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrpFrame {
    pub channel: Channel,
    pub flags: u8,
    /// Declared length of the decoded payload in bytes.
    pub length: u32,
    /// CRC32 of the decoded payload as hex, when the flag is set.
    pub crc32: Option<String>,
    pub payload_b64: String,
}

impl MrpFrame {
    /// Builds a frame around a raw payload.
    pub fn build(channel: Channel, payload: &[u8], with_crc: bool) -> Self {
        Self {
            channel,
            flags: if with_crc { MRP_FLAG_CRC } else { 0 },
            length: payload.len() as u32,
            crc32: with_crc.then(|| format!("{:08X}", crc32fast::hash(payload))),
            payload_b64: BASE64.encode(payload),
        }
    }

    pub fn has_crc(&self) -> bool {
        self.flags & MRP_FLAG_CRC != 0
    }

    /// Serializes the frame to its JSON wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let wire = WireFrame {
            magic: MRP_MAGIC.to_string(),
            channel: self.channel.letter().to_string(),
            flags: self.flags,
            length: self.length,
            crc32: self.crc32.clone(),
            payload_b64: self.payload_b64.clone(),
        };
        serde_json::to_vec(&wire).expect("frame struct always serializes")
    }

    /// Structurally parses a frame: JSON shape, magic, channel id. Payload
    /// decoding and CRC verification are left to [`MrpFrame::verify_payload`]
    /// so a corrupted-but-parseable frame survives for recovery.
    pub fn parse(data: &[u8]) -> Result<Self, MrpFrameError> {
        let wire: WireFrame = serde_json::from_slice(data)
            .map_err(|e| MrpFrameError::MalformedFrame(e.to_string()))?;
        if wire.magic != MRP_MAGIC {
            return Err(MrpFrameError::BadMagic(wire.magic));
        }
        let channel =
            Channel::from_letter(&wire.channel).ok_or(MrpFrameError::BadChannel(wire.channel))?;
        Ok(Self {
            channel,
            flags: wire.flags,
            length: wire.length,
            crc32: wire.crc32,
            payload_b64: wire.payload_b64,
        })
    }

    /// Decodes the payload and checks the declared length. No CRC check.
    pub fn decode_payload(&self) -> Result<Vec<u8>, MrpFrameError> {
        let payload = BASE64
            .decode(&self.payload_b64)
            .map_err(|e| MrpFrameError::InvalidBase64(e.to_string()))?;
        if payload.len() as u32 != self.length {
            return Err(MrpFrameError::LengthMismatch {
                declared: self.length,
                actual: payload.len() as u32,
            });
        }
        Ok(payload)
    }

    /// Decodes and fully verifies the payload against the frame's CRC.
    ///
    /// A mismatch here is how transport corruption shows up: the crc32 field
    /// records the payload at construction time, and decode must detect a
    /// divergence, never silently trust it.
    pub fn verify_payload(&self) -> Result<Vec<u8>, MrpFrameError> {
        let payload = self.decode_payload()?;
        if self.has_crc() {
            let declared = self.crc32.as_deref().ok_or(MrpFrameError::MissingCrc)?;
            let expected = u32::from_str_radix(declared, 16)
                .map_err(|_| MrpFrameError::BadCrcEncoding(declared.to_string()))?;
            let computed = crc32fast::hash(&payload);
            if computed != expected {
                return Err(MrpFrameError::CrcMismatch { expected, computed });
            }
        }
        Ok(payload)
    }

    /// Parses and fully verifies a frame in one step.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, Vec<u8>), MrpFrameError> {
        let frame = Self::parse(data)?;
        let payload = frame.verify_payload()?;
        Ok((frame, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let frame = MrpFrame::build(Channel::Red, b"payload bytes", true);
        let json: serde_json::Value = serde_json::from_slice(&frame.to_bytes()).unwrap();

        assert_eq!(json["magic"], "MRP1");
        assert_eq!(json["channel"], "R");
        assert_eq!(json["flags"], 1);
        assert_eq!(json["length"], 13);
        assert_eq!(json["payload_b64"], BASE64.encode(b"payload bytes"));

        let crc = json["crc32"].as_str().unwrap();
        assert_eq!(crc.len(), 8);
        assert!(crc.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(crc, crc.to_uppercase());
    }

    #[test]
    fn test_crc_field_omitted_without_flag() {
        let frame = MrpFrame::build(Channel::Green, b"x", false);
        let json: serde_json::Value = serde_json::from_slice(&frame.to_bytes()).unwrap();
        assert!(json.get("crc32").is_none());
    }

    #[test]
    fn test_roundtrip() {
        let frame = MrpFrame::build(Channel::Blue, b"some sidecar data", true);
        let (parsed, payload) = MrpFrame::from_bytes(&frame.to_bytes()).unwrap();
        assert_eq!(parsed, frame);
        assert_eq!(payload, b"some sidecar data");
    }

    #[test]
    fn test_bad_magic() {
        let bytes = MrpFrame::build(Channel::Red, b"x", true).to_bytes();
        let tampered = String::from_utf8(bytes).unwrap().replace("MRP1", "MRPX");
        assert!(matches!(
            MrpFrame::parse(tampered.as_bytes()),
            Err(MrpFrameError::BadMagic(m)) if m == "MRPX"
        ));
    }

    #[test]
    fn test_bad_channel() {
        let json = br#"{"magic":"MRP1","channel":"Q","flags":0,"length":0,"payload_b64":""}"#;
        assert!(matches!(
            MrpFrame::parse(json),
            Err(MrpFrameError::BadChannel(c)) if c == "Q"
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let mut frame = MrpFrame::build(Channel::Red, b"four", true);
        frame.length = 7;
        assert!(matches!(
            frame.decode_payload(),
            Err(MrpFrameError::LengthMismatch {
                declared: 7,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_corrupted_payload_fails_crc() {
        let frame = MrpFrame::build(Channel::Green, b"metadata stream", true);
        let tampered = MrpFrame {
            payload_b64: BASE64.encode(b"metadata strean"),
            ..frame
        };
        assert!(matches!(
            tampered.verify_payload(),
            Err(MrpFrameError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_crc_parsed_case_insensitively() {
        let mut frame = MrpFrame::build(Channel::Red, b"abc", true);
        frame.crc32 = frame.crc32.take().map(|c| c.to_lowercase());
        assert!(frame.verify_payload().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            MrpFrame::parse(b"{not json"),
            Err(MrpFrameError::MalformedFrame(_))
        ));
    }
}
