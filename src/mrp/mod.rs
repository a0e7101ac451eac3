//! MRP — the Multi-channel Resonance Protocol.
//!
//! Three independent frames, one per color channel: red carries the
//! message, green the metadata, blue a parity/verification sidecar that can
//! rebuild exactly one failed data channel.

pub mod channel;
pub mod codec;
pub mod frame;

pub use channel::{
    embed_channel_stream, embed_frames, extract_channel_stream, extract_frames,
    ChannelStreamError, LENGTH_PREFIX_BITS,
};
pub use codec::{
    decode_mrp, decode_mrp_from_grid, encode_mrp, encode_mrp_into_grid, verify_frames,
    xor_parity, ChannelIntegrity, ChannelReport, IntegrityReport, IntegrityStatus,
    MrpDecoded, MrpEncodeSummary, MrpError, MrpOptions, ParitySidecar, ECC_SCHEME_XOR,
};
pub use frame::{MrpFrame, MrpFrameError, MRP_FLAG_CRC, MRP_MAGIC};
