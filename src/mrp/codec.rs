//! The MRP codec: encode, integrity classification, and single-erasure
//! recovery.
//!
//! Encode writes three independent frames: the message rides the red
//! channel, the metadata rides green, and blue carries a parity sidecar —
//! the CRC32 of each data stream plus an XOR parity block. A single XOR
//! parity across two data streams is a (2,1)-erasure code: it can
//! reconstruct at most one lost stream, never two.
//!
//! Decode classifies every result into one of four disjoint outcomes
//! rather than collapsing them, because a consumer needs to distinguish
//! "trust this blindly" from "trust this, but the tamper-evidence mechanism
//! itself was compromised":
//!
//! - `ok`         — all three channels verified
//! - `degraded`   — message and metadata verified, sidecar corrupt
//! - `recovered`  — one data channel failed its CRC and was rebuilt from
//!                  the parity block, confirmed against the sidecar CRC
//! - `unrecoverable` — two erasures, or an erasure with no trustworthy
//!                  sidecar; the call fails and returns no message at all

use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::carrier::{CarrierError, Channel, PixelGrid};

use super::channel::{embed_frames, extract_channel_stream, ChannelStreamError};
use super::frame::{MrpFrame, MrpFrameError};

/// The only erasure-coding scheme currently defined.
pub const ECC_SCHEME_XOR: &str = "xor";

/// Errors from MRP encoding and decoding.
#[derive(Error, Debug)]
pub enum MrpError {
    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error(transparent)]
    Stream(#[from] ChannelStreamError),

    #[error(transparent)]
    Frame(#[from] MrpFrameError),

    #[error("Metadata is not valid JSON: {0}")]
    BadMetadata(String),

    #[error("Sidecar is not a valid parity descriptor: {0}")]
    BadSidecar(String),

    #[error("Unsupported ecc scheme '{0}'")]
    UnsupportedEccScheme(String),

    #[error("Channel {channel} payload is not base64 text: {detail}")]
    BadPayloadText { channel: Channel, detail: String },

    #[error(
        "Recovery failed for channel {channel}: reconstructed bytes hash to \
         {computed:08X}, sidecar records {expected:08X}"
    )]
    RecoveryFailed {
        channel: Channel,
        expected: u32,
        computed: u32,
    },

    #[error("Unrecoverable corruption: {0}")]
    UnrecoverableCorruption(String),
}

/// The blue channel's payload: everything needed to cross-check the two
/// data channels and rebuild one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParitySidecar {
    /// CRC32 of the red channel's frame payload, hex.
    pub crc_r: String,
    /// CRC32 of the green channel's frame payload, hex.
    pub crc_g: String,
    pub ecc_scheme: String,
    /// The parity block, base64 (the embedded form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parity_block_b64: Option<String>,
    /// The parity block, hex (accepted from externally supplied triples).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parity: Option<String>,
}

impl ParitySidecar {
    fn new(crc_r: u32, crc_g: u32, parity_block: &[u8]) -> Self {
        Self {
            crc_r: format!("{:08X}", crc_r),
            crc_g: format!("{:08X}", crc_g),
            ecc_scheme: ECC_SCHEME_XOR.to_string(),
            parity_block_b64: Some(BASE64.encode(parity_block)),
            parity: None,
        }
    }

    /// The recorded CRC for a data channel. Blue has no entry: the sidecar
    /// cannot vouch for itself.
    pub fn crc_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Red => Some(&self.crc_r),
            Channel::Green => Some(&self.crc_g),
            Channel::Blue => None,
        }
    }

    /// Decodes the parity block from whichever representation is present.
    pub fn parity_block(&self) -> Result<Vec<u8>, MrpError> {
        if let Some(b64) = &self.parity_block_b64 {
            return BASE64
                .decode(b64)
                .map_err(|e| MrpError::BadSidecar(format!("parity_block_b64: {}", e)));
        }
        if let Some(hex) = &self.parity {
            return decode_hex(hex).map_err(|e| MrpError::BadSidecar(format!("parity: {}", e)));
        }
        Err(MrpError::BadSidecar("missing parity block".to_string()))
    }
}

/// XOR parity over two byte streams. The overlap is XORed; the tail of the
/// longer stream is copied as-is, so the block is always as long as the
/// longer input.
pub fn xor_parity(r: &[u8], g: &[u8]) -> Vec<u8> {
    let len = r.len().max(g.len());
    (0..len)
        .map(|i| match (r.get(i), g.get(i)) {
            (Some(a), Some(b)) => a ^ b,
            (Some(a), None) => *a,
            (None, Some(b)) => *b,
            (None, None) => 0,
        })
        .collect()
}

/// Inverse of [`xor_parity`]: rebuilds the failed stream from the parity
/// block and the surviving stream. Positions past the parity block come out
/// as zero; the caller's CRC gate rejects any such shortfall.
fn recover_stream(parity: &[u8], surviving: &[u8], failed_len: usize) -> Vec<u8> {
    (0..failed_len)
        .map(|i| {
            let p = parity.get(i).copied().unwrap_or(0);
            match surviving.get(i) {
                Some(s) => p ^ s,
                None => p,
            }
        })
        .collect()
}

/// Outcome of an MRP decode's integrity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityStatus {
    Ok,
    Degraded,
    Recovered,
    Unrecoverable,
}

impl fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IntegrityStatus::Ok => "ok",
            IntegrityStatus::Degraded => "degraded",
            IntegrityStatus::Recovered => "recovered",
            IntegrityStatus::Unrecoverable => "unrecoverable",
        };
        write!(f, "{}", label)
    }
}

/// Per-channel integrity verdict. `crc_ok` reflects the post-recovery
/// state: a rebuilt channel that passed the sidecar CRC reads as intact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelIntegrity {
    pub crc_ok: bool,
    pub recovered: bool,
}

/// Integrity verdicts for all three channels. Derived on every decode,
/// never stored.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChannelReport {
    #[serde(rename = "R")]
    pub r: ChannelIntegrity,
    #[serde(rename = "G")]
    pub g: ChannelIntegrity,
    #[serde(rename = "B")]
    pub b: ChannelIntegrity,
}

impl ChannelReport {
    pub fn get(&self, channel: Channel) -> ChannelIntegrity {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }
}

/// The full integrity report returned with every successful decode.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IntegrityReport {
    pub status: IntegrityStatus,
    pub channels: ChannelReport,
}

/// Configuration shared by MRP encode and decode.
#[derive(Debug, Clone)]
pub struct MrpOptions {
    /// Low bits used per pixel channel (1 or 4).
    pub bits_per_channel: u8,
    /// Whether to output verbose information.
    pub verbose: bool,
}

impl Default for MrpOptions {
    fn default() -> Self {
        Self {
            bits_per_channel: 1,
            verbose: false,
        }
    }
}

/// Result of an MRP encode.
#[derive(Debug, Clone)]
pub struct MrpEncodeSummary {
    /// Length of the red channel's frame payload (base64 of the message).
    pub message_payload_bytes: usize,
    /// Length of the green channel's frame payload (base64 of the metadata
    /// JSON).
    pub metadata_payload_bytes: usize,
    /// Length of the parity block.
    pub parity_bytes: usize,
    pub crc_r: String,
    pub crc_g: String,
    /// Bits embedded per channel, length prefix included, in R, G, B order.
    pub embedded_bits: [u64; 3],
}

/// A successful MRP decode.
#[derive(Debug, Clone)]
pub struct MrpDecoded {
    pub message: String,
    pub metadata: Value,
    pub integrity: IntegrityReport,
}

/// Encodes a message and its metadata into the cover image at `cover_path`
/// and writes the stego image to `out_path`.
pub fn encode_mrp<P: AsRef<Path>>(
    cover_path: P,
    message: &str,
    metadata: &Value,
    out_path: P,
    options: &MrpOptions,
) -> Result<MrpEncodeSummary, MrpError> {
    let mut grid = PixelGrid::from_file(cover_path)?;
    let summary = encode_mrp_into_grid(&mut grid, message, metadata, options)?;
    grid.save(out_path)?;
    Ok(summary)
}

/// Encodes into an in-memory grid. Capacity is verified for all three
/// channels before any of them is written, so a failed encode leaves the
/// grid untouched.
pub fn encode_mrp_into_grid(
    grid: &mut PixelGrid,
    message: &str,
    metadata: &Value,
    options: &MrpOptions,
) -> Result<MrpEncodeSummary, MrpError> {
    let r_bytes = BASE64.encode(message.as_bytes()).into_bytes();
    let metadata_json =
        serde_json::to_string(metadata).map_err(|e| MrpError::BadMetadata(e.to_string()))?;
    let g_bytes = BASE64.encode(metadata_json.as_bytes()).into_bytes();

    let crc_r = crc32fast::hash(&r_bytes);
    let crc_g = crc32fast::hash(&g_bytes);
    let parity_block = xor_parity(&r_bytes, &g_bytes);
    let sidecar = ParitySidecar::new(crc_r, crc_g, &parity_block);
    let b_bytes =
        serde_json::to_vec(&sidecar).map_err(|e| MrpError::BadSidecar(e.to_string()))?;

    let payloads = [(Channel::Red, r_bytes), (Channel::Green, g_bytes), (Channel::Blue, b_bytes)];
    let streams: Vec<(Channel, Vec<u8>)> = payloads
        .iter()
        .map(|(channel, payload)| {
            (*channel, MrpFrame::build(*channel, payload, true).to_bytes())
        })
        .collect();

    // All-or-nothing: check every channel before mutating any pixel.
    let available = grid.channel_capacity_bits(options.bits_per_channel);
    let mut embedded_bits = [0u64; 3];
    for (i, (_, stream)) in streams.iter().enumerate() {
        let needed = (4 + stream.len()) as u64 * 8;
        if needed > available {
            return Err(MrpError::Carrier(CarrierError::CapacityExceeded {
                needed,
                available,
            }));
        }
        embedded_bits[i] = needed;
    }

    if options.verbose {
        eprintln!(
            "MRP embed: R={} G={} B={} frame bytes, parity {} bytes, {} bits/channel",
            streams[0].1.len(),
            streams[1].1.len(),
            streams[2].1.len(),
            parity_block.len(),
            options.bits_per_channel
        );
    }

    let frames: Vec<(Channel, &[u8])> = streams
        .iter()
        .map(|(channel, stream)| (*channel, stream.as_slice()))
        .collect();
    embed_frames(grid, &frames, options.bits_per_channel)?;

    Ok(MrpEncodeSummary {
        message_payload_bytes: payloads[0].1.len(),
        metadata_payload_bytes: payloads[1].1.len(),
        parity_bytes: parity_block.len(),
        crc_r: format!("{:08X}", crc_r),
        crc_g: format!("{:08X}", crc_g),
        embedded_bits,
    })
}

/// Decodes an MRP image, recovering a single failed data channel when the
/// parity sidecar allows it.
pub fn decode_mrp<P: AsRef<Path>>(
    path: P,
    options: &MrpOptions,
) -> Result<MrpDecoded, MrpError> {
    let grid = PixelGrid::from_file(path)?;
    decode_mrp_from_grid(&grid, options)
}

/// Decodes from an in-memory grid.
pub fn decode_mrp_from_grid(
    grid: &PixelGrid,
    options: &MrpOptions,
) -> Result<MrpDecoded, MrpError> {
    let slots = Channel::ALL.map(|channel| read_slot(grid, channel, options));
    resolve(slots, options.verbose)
}

/// Classifies an externally supplied frame triple without touching an
/// image. Recovery is *checked* (the report can come back `recovered`) but
/// nothing is decoded or returned; failures classify as `unrecoverable`
/// instead of erroring.
pub fn verify_frames(r: &[u8], g: &[u8], b: &[u8]) -> IntegrityReport {
    let slots = [
        slot_from_bytes(Channel::Red, r),
        slot_from_bytes(Channel::Green, g),
        slot_from_bytes(Channel::Blue, b),
    ];
    let flags = slots.each_ref().map(|slot| ChannelIntegrity {
        crc_ok: slot.crc_ok,
        recovered: false,
    });

    match resolve(slots, false) {
        Ok(decoded) => decoded.integrity,
        Err(_) => IntegrityReport {
            status: IntegrityStatus::Unrecoverable,
            channels: ChannelReport {
                r: flags[0],
                g: flags[1],
                b: flags[2],
            },
        },
    }
}

/// One channel's extraction state going into classification.
struct ChannelSlot {
    /// Structurally parsed frame, kept even when verification failed: its
    /// declared length drives recovery.
    frame: Option<MrpFrame>,
    /// Verified payload bytes; present iff `crc_ok`.
    payload: Option<Vec<u8>>,
    crc_ok: bool,
}

impl ChannelSlot {
    fn failed(frame: Option<MrpFrame>) -> Self {
        Self {
            frame,
            payload: None,
            crc_ok: false,
        }
    }
}

fn read_slot(grid: &PixelGrid, channel: Channel, options: &MrpOptions) -> ChannelSlot {
    let stream = match extract_channel_stream(grid, channel, options.bits_per_channel) {
        Ok(stream) => stream,
        Err(e) => {
            if options.verbose {
                eprintln!("Channel {}: stream extraction failed: {}", channel, e);
            }
            return ChannelSlot::failed(None);
        }
    };
    slot_from_stream(channel, &stream, options.verbose)
}

fn slot_from_bytes(channel: Channel, data: &[u8]) -> ChannelSlot {
    slot_from_stream(channel, data, false)
}

fn slot_from_stream(channel: Channel, stream: &[u8], verbose: bool) -> ChannelSlot {
    let frame = match MrpFrame::parse(stream) {
        Ok(frame) => frame,
        Err(e) => {
            if verbose {
                eprintln!("Channel {}: frame parse failed: {}", channel, e);
            }
            return ChannelSlot::failed(None);
        }
    };
    if frame.channel != channel {
        if verbose {
            eprintln!(
                "Channel {}: frame declares channel {}, treating as corrupt",
                channel, frame.channel
            );
        }
        return ChannelSlot::failed(Some(frame));
    }
    match frame.verify_payload() {
        Ok(payload) => {
            if verbose {
                eprintln!("Channel {}: verified ({} payload bytes)", channel, payload.len());
            }
            ChannelSlot {
                frame: Some(frame),
                payload: Some(payload),
                crc_ok: true,
            }
        }
        Err(e) => {
            if verbose {
                eprintln!("Channel {}: verification failed: {}", channel, e);
            }
            ChannelSlot::failed(Some(frame))
        }
    }
}

/// The decode state machine (spec'd outcomes: ok / degraded / recovered /
/// unrecoverable).
fn resolve(slots: [ChannelSlot; 3], verbose: bool) -> Result<MrpDecoded, MrpError> {
    let [r, g, b] = slots;

    // The sidecar is only trustworthy if blue's own frame CRC passed AND
    // its payload parses as a parity descriptor.
    let sidecar: Option<ParitySidecar> = if b.crc_ok {
        b.payload
            .as_deref()
            .and_then(|payload| serde_json::from_slice(payload).ok())
    } else {
        None
    };
    let b_trusted = sidecar.is_some();

    let verdict = |slot: &ChannelSlot| ChannelIntegrity {
        crc_ok: slot.crc_ok,
        recovered: false,
    };

    match (r.crc_ok, g.crc_ok) {
        (true, true) => {
            let status = if b_trusted {
                IntegrityStatus::Ok
            } else {
                IntegrityStatus::Degraded
            };
            let message = decode_text(Channel::Red, payload_of(&r))?;
            let metadata = parse_metadata(payload_of(&g))?;
            Ok(MrpDecoded {
                message,
                metadata,
                integrity: IntegrityReport {
                    status,
                    channels: ChannelReport {
                        r: verdict(&r),
                        g: verdict(&g),
                        b: ChannelIntegrity {
                            crc_ok: b_trusted,
                            recovered: false,
                        },
                    },
                },
            })
        }
        (r_ok, g_ok) if r_ok != g_ok && b_trusted => {
            let sidecar = sidecar.expect("b_trusted implies a parsed sidecar");
            if sidecar.ecc_scheme != ECC_SCHEME_XOR {
                return Err(MrpError::UnsupportedEccScheme(sidecar.ecc_scheme));
            }

            let (failed_channel, failed_slot, surviving_slot) = if r_ok {
                (Channel::Green, &g, &r)
            } else {
                (Channel::Red, &r, &g)
            };
            let surviving = payload_of(surviving_slot);
            let parity = sidecar.parity_block()?;

            // The failed frame's declared length is trusted when the frame
            // at least parsed; without even that, the parity block's own
            // length is the best available estimate. Either way the sidecar
            // CRC gates the result.
            let failed_len = failed_slot
                .frame
                .as_ref()
                .map(|frame| frame.length as usize)
                .unwrap_or(parity.len());

            let recovered = recover_stream(&parity, surviving, failed_len);
            let expected_hex = sidecar
                .crc_for(failed_channel)
                .expect("recovery only targets data channels");
            let expected = parse_hex32(expected_hex).map_err(|_| {
                MrpError::BadSidecar(format!("unparseable crc '{}'", expected_hex))
            })?;
            let computed = crc32fast::hash(&recovered);
            if computed != expected {
                return Err(MrpError::RecoveryFailed {
                    channel: failed_channel,
                    expected,
                    computed,
                });
            }
            if verbose {
                eprintln!(
                    "Channel {}: recovered {} bytes via parity, CRC {:08X} confirmed",
                    failed_channel, failed_len, computed
                );
            }

            let (message, metadata) = match failed_channel {
                Channel::Red => (
                    decode_text(Channel::Red, &recovered)?,
                    parse_metadata(surviving)?,
                ),
                _ => (
                    decode_text(Channel::Red, surviving)?,
                    parse_metadata(&recovered)?,
                ),
            };

            let healed = ChannelIntegrity {
                crc_ok: true,
                recovered: true,
            };
            let intact = ChannelIntegrity {
                crc_ok: true,
                recovered: false,
            };
            Ok(MrpDecoded {
                message,
                metadata,
                integrity: IntegrityReport {
                    status: IntegrityStatus::Recovered,
                    channels: ChannelReport {
                        r: if failed_channel == Channel::Red { healed } else { intact },
                        g: if failed_channel == Channel::Green { healed } else { intact },
                        b: intact,
                    },
                },
            })
        }
        _ => {
            let mut failed: Vec<char> = Vec::new();
            if !r.crc_ok {
                failed.push('R');
            }
            if !g.crc_ok {
                failed.push('G');
            }
            if !b_trusted {
                failed.push('B');
            }
            let list: String = failed
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("+");
            Err(MrpError::UnrecoverableCorruption(format!(
                "channels {} failed integrity; a single XOR parity stream cannot \
                 resolve more than one erasure",
                list
            )))
        }
    }
}

/// Payload of a verified slot. Only called on slots whose `crc_ok` is true.
fn payload_of(slot: &ChannelSlot) -> &[u8] {
    slot.payload
        .as_deref()
        .expect("verified channel carries its payload")
}

/// Decodes a data channel's frame payload (base64 text) to the original
/// UTF-8 string.
fn decode_text(channel: Channel, payload: &[u8]) -> Result<String, MrpError> {
    let decoded = BASE64.decode(payload).map_err(|e| MrpError::BadPayloadText {
        channel,
        detail: e.to_string(),
    })?;
    String::from_utf8(decoded).map_err(|e| MrpError::BadPayloadText {
        channel,
        detail: e.to_string(),
    })
}

fn parse_metadata(payload: &[u8]) -> Result<Value, MrpError> {
    let text = decode_text(Channel::Green, payload)?;
    serde_json::from_str(&text).map_err(|e| MrpError::BadMetadata(e.to_string()))
}

fn parse_hex32(s: &str) -> Result<u32, std::num::ParseIntError> {
    u32::from_str_radix(s.trim(), 16)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{create_cover_image, CoverStyle};
    use crate::mrp::channel::embed_channel_stream;
    use serde_json::json;

    fn metadata() -> Value {
        json!({"author": "veil", "seq": 7})
    }

    fn encoded_grid(message: &str) -> PixelGrid {
        let mut grid = create_cover_image(96, 96, CoverStyle::Noise);
        encode_mrp_into_grid(&mut grid, message, &metadata(), &MrpOptions::default()).unwrap();
        grid
    }

    /// Rewrites one channel's embedded frame after passing it through `f`.
    fn tamper_channel(grid: &mut PixelGrid, channel: Channel, f: impl Fn(String) -> String) {
        let stream = extract_channel_stream(grid, channel, 1).unwrap();
        let tampered = f(String::from_utf8(stream).unwrap()).into_bytes();
        embed_channel_stream(grid, channel, 1, &tampered).unwrap();
    }

    /// Swaps one base64 character inside the frame's payload_b64 value,
    /// keeping the JSON well-formed but breaking the payload CRC.
    fn corrupt_payload(json_text: String) -> String {
        let marker = "\"payload_b64\":\"";
        let start = json_text.find(marker).unwrap() + marker.len();
        let mut chars: Vec<char> = json_text.chars().collect();
        chars[start + 2] = if chars[start + 2] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_xor_parity_overlap_and_tail() {
        let parity = xor_parity(b"\x0F\xF0\xAA", b"\xFF\x0F");
        assert_eq!(parity, vec![0xF0, 0xFF, 0xAA]);

        let parity = xor_parity(b"\x01", b"\x02\x03\x04");
        assert_eq!(parity, vec![0x03, 0x03, 0x04]);
    }

    #[test]
    fn test_parity_recovers_either_stream() {
        let r = b"some longer stream".as_slice();
        let g = b"short".as_slice();
        let parity = xor_parity(r, g);

        assert_eq!(recover_stream(&parity, g, r.len()), r);
        assert_eq!(recover_stream(&parity, r, g.len()), g);
    }

    #[test]
    fn test_roundtrip_all_channels_ok() {
        let grid = encoded_grid("resonant message");
        let decoded = decode_mrp_from_grid(&grid, &MrpOptions::default()).unwrap();

        assert_eq!(decoded.message, "resonant message");
        assert_eq!(decoded.metadata, metadata());
        assert_eq!(decoded.integrity.status, IntegrityStatus::Ok);
        for channel in Channel::ALL {
            let verdict = decoded.integrity.channels.get(channel);
            assert!(verdict.crc_ok);
            assert!(!verdict.recovered);
        }
    }

    #[test]
    fn test_red_corruption_recovers() {
        let mut grid = encoded_grid("heal me");
        tamper_channel(&mut grid, Channel::Red, corrupt_payload);

        let decoded = decode_mrp_from_grid(&grid, &MrpOptions::default()).unwrap();
        assert_eq!(decoded.message, "heal me");
        assert_eq!(decoded.metadata, metadata());
        assert_eq!(decoded.integrity.status, IntegrityStatus::Recovered);
        assert!(decoded.integrity.channels.r.recovered);
        assert!(decoded.integrity.channels.r.crc_ok);
        assert!(!decoded.integrity.channels.g.recovered);
    }

    #[test]
    fn test_green_corruption_recovers() {
        let mut grid = encoded_grid("metadata heals too");
        tamper_channel(&mut grid, Channel::Green, corrupt_payload);

        let decoded = decode_mrp_from_grid(&grid, &MrpOptions::default()).unwrap();
        assert_eq!(decoded.message, "metadata heals too");
        assert_eq!(decoded.metadata, metadata());
        assert_eq!(decoded.integrity.status, IntegrityStatus::Recovered);
        assert!(decoded.integrity.channels.g.recovered);
    }

    #[test]
    fn test_double_corruption_is_unrecoverable() {
        let mut grid = encoded_grid("two erasures");
        tamper_channel(&mut grid, Channel::Red, corrupt_payload);
        tamper_channel(&mut grid, Channel::Green, corrupt_payload);

        let result = decode_mrp_from_grid(&grid, &MrpOptions::default());
        assert!(matches!(
            result,
            Err(MrpError::UnrecoverableCorruption(_))
        ));
    }

    #[test]
    fn test_sidecar_only_corruption_degrades() {
        let mut grid = encoded_grid("still intact");
        tamper_channel(&mut grid, Channel::Blue, corrupt_payload);

        let decoded = decode_mrp_from_grid(&grid, &MrpOptions::default()).unwrap();
        assert_eq!(decoded.message, "still intact");
        assert_eq!(decoded.metadata, metadata());
        assert_eq!(decoded.integrity.status, IntegrityStatus::Degraded);
        assert!(!decoded.integrity.channels.b.crc_ok);
        assert!(decoded.integrity.channels.r.crc_ok);
    }

    #[test]
    fn test_data_and_sidecar_corruption_is_unrecoverable() {
        let mut grid = encoded_grid("no safety net");
        tamper_channel(&mut grid, Channel::Red, corrupt_payload);
        tamper_channel(&mut grid, Channel::Blue, corrupt_payload);

        let result = decode_mrp_from_grid(&grid, &MrpOptions::default());
        assert!(matches!(
            result,
            Err(MrpError::UnrecoverableCorruption(_))
        ));
    }

    #[test]
    fn test_capacity_checked_before_any_write() {
        let mut grid = create_cover_image(8, 8, CoverStyle::Noise);
        let before = grid.clone();
        let long = "x".repeat(500);

        let result =
            encode_mrp_into_grid(&mut grid, &long, &metadata(), &MrpOptions::default());
        assert!(matches!(
            result,
            Err(MrpError::Carrier(CarrierError::CapacityExceeded { .. }))
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_roundtrip_4_bits_per_channel() {
        let mut grid = create_cover_image(48, 48, CoverStyle::Texture);
        let options = MrpOptions {
            bits_per_channel: 4,
            ..Default::default()
        };
        encode_mrp_into_grid(&mut grid, "denser embedding", &metadata(), &options).unwrap();
        let decoded = decode_mrp_from_grid(&grid, &options).unwrap();
        assert_eq!(decoded.message, "denser embedding");
        assert_eq!(decoded.integrity.status, IntegrityStatus::Ok);
    }

    #[test]
    fn test_verify_frames_classifies_clean_triple() {
        let r_payload = BASE64.encode(b"message").into_bytes();
        let g_payload = BASE64.encode(b"{\"k\":1}").into_bytes();
        let parity = xor_parity(&r_payload, &g_payload);
        let sidecar = ParitySidecar::new(
            crc32fast::hash(&r_payload),
            crc32fast::hash(&g_payload),
            &parity,
        );
        let b_payload = serde_json::to_vec(&sidecar).unwrap();

        let r = MrpFrame::build(Channel::Red, &r_payload, true).to_bytes();
        let g = MrpFrame::build(Channel::Green, &g_payload, true).to_bytes();
        let b = MrpFrame::build(Channel::Blue, &b_payload, true).to_bytes();

        let report = verify_frames(&r, &g, &b);
        assert_eq!(report.status, IntegrityStatus::Ok);
    }

    #[test]
    fn test_verify_frames_accepts_hex_parity_form() {
        let r_payload = BASE64.encode(b"message").into_bytes();
        let g_payload = BASE64.encode(b"{\"k\":1}").into_bytes();
        let parity = xor_parity(&r_payload, &g_payload);
        let sidecar = ParitySidecar {
            crc_r: format!("{:08X}", crc32fast::hash(&r_payload)),
            crc_g: format!("{:08X}", crc32fast::hash(&g_payload)),
            ecc_scheme: ECC_SCHEME_XOR.to_string(),
            parity_block_b64: None,
            parity: Some(parity.iter().map(|b| format!("{:02X}", b)).collect()),
        };
        let b_payload = serde_json::to_vec(&sidecar).unwrap();

        // Corrupt R so classification has to touch the parity block.
        let mut bad_r_payload = r_payload.clone();
        bad_r_payload[0] = if bad_r_payload[0] == b'A' { b'B' } else { b'A' };
        let mut r_frame = MrpFrame::build(Channel::Red, &r_payload, true);
        r_frame.payload_b64 = BASE64.encode(&bad_r_payload);

        let r = r_frame.to_bytes();
        let g = MrpFrame::build(Channel::Green, &g_payload, true).to_bytes();
        let b = MrpFrame::build(Channel::Blue, &b_payload, true).to_bytes();

        let report = verify_frames(&r, &g, &b);
        assert_eq!(report.status, IntegrityStatus::Recovered);
        assert!(report.channels.r.recovered);
    }

    #[test]
    fn test_verify_frames_flags_double_failure() {
        let r_payload = BASE64.encode(b"one").into_bytes();
        let g_payload = BASE64.encode(b"{\"x\":2}").into_bytes();
        let parity = xor_parity(&r_payload, &g_payload);
        let sidecar = ParitySidecar::new(
            crc32fast::hash(&r_payload),
            crc32fast::hash(&g_payload),
            &parity,
        );
        let b_payload = serde_json::to_vec(&sidecar).unwrap();

        let mut r_frame = MrpFrame::build(Channel::Red, &r_payload, true);
        r_frame.crc32 = Some("00000000".to_string());
        let mut g_frame = MrpFrame::build(Channel::Green, &g_payload, true);
        g_frame.crc32 = Some("00000000".to_string());

        let report = verify_frames(
            &r_frame.to_bytes(),
            &g_frame.to_bytes(),
            &MrpFrame::build(Channel::Blue, &b_payload, true).to_bytes(),
        );
        assert_eq!(report.status, IntegrityStatus::Unrecoverable);
        assert!(!report.channels.r.crc_ok);
        assert!(!report.channels.g.crc_ok);
        assert!(report.channels.b.crc_ok);
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0AfF").unwrap(), vec![0x0A, 0xFF]);
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }
}
