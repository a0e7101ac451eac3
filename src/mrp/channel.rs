//! Per-channel stream adapter.
//!
//! Each MRP frame travels through exactly one color channel, independent of
//! the other two: a 4-byte big-endian length prefix followed by the frame
//! bytes, row-major, MSB-first. This is deliberately NOT the interleaved
//! substrate the single-stream protocol uses — a damaged green channel must
//! leave red and blue readable.

use thiserror::Error;

use crate::bits::{bits_to_bytes_msb, bytes_to_bits_msb};
use crate::carrier::{check_bit_depth, CarrierError, Channel, PixelGrid};

/// Bits occupied by the stream length prefix.
pub const LENGTH_PREFIX_BITS: usize = 32;

/// Errors from per-channel stream embedding and extraction.
#[derive(Error, Debug)]
pub enum ChannelStreamError {
    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error("Channel {channel}: carrier too small for a length prefix ({available} bits)")]
    TruncatedPrefix { channel: Channel, available: u64 },

    #[error(
        "Channel {channel}: declared stream of {declared} bytes exceeds the \
         {available} payload bits remaining in the channel"
    )]
    ImplausibleLength {
        channel: Channel,
        declared: u64,
        available: u64,
    },
}

/// Embeds one byte stream into a single color channel, length-prefixed.
pub fn embed_channel_stream(
    grid: &mut PixelGrid,
    channel: Channel,
    bits_per_channel: u8,
    data: &[u8],
) -> Result<(), ChannelStreamError> {
    let mut stream = Vec::with_capacity(4 + data.len());
    stream.extend_from_slice(&(data.len() as u32).to_be_bytes());
    stream.extend_from_slice(data);

    let bits = bytes_to_bits_msb(&stream);
    grid.write_channel(channel, bits_per_channel, &bits)?;
    Ok(())
}

/// Extracts the byte stream embedded in a single color channel.
///
/// Reads the 32-bit length prefix first, then exactly that many payload
/// bytes continuing from where the prefix read left off. A declared length
/// beyond the channel's remaining capacity fails here, before any payload
/// read — it means the prefix itself is damaged or absent.
pub fn extract_channel_stream(
    grid: &PixelGrid,
    channel: Channel,
    bits_per_channel: u8,
) -> Result<Vec<u8>, ChannelStreamError> {
    check_bit_depth(bits_per_channel)?;

    let capacity = grid.channel_capacity_bits(bits_per_channel);
    if capacity < LENGTH_PREFIX_BITS as u64 {
        return Err(ChannelStreamError::TruncatedPrefix {
            channel,
            available: capacity,
        });
    }

    let prefix_bits = grid.read_channel(channel, bits_per_channel, LENGTH_PREFIX_BITS, 0)?;
    let prefix = bits_to_bytes_msb(&prefix_bits);
    let declared = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as u64;

    // The prefix occupies whole pixels (32 divides evenly by both depths).
    let start_pixel = LENGTH_PREFIX_BITS / bits_per_channel as usize;
    let available = capacity - (start_pixel as u64 * bits_per_channel as u64);
    if declared * 8 > available {
        return Err(ChannelStreamError::ImplausibleLength {
            channel,
            declared,
            available,
        });
    }

    let bits = grid.read_channel(channel, bits_per_channel, declared as usize * 8, start_pixel)?;
    Ok(bits_to_bytes_msb(&bits))
}

/// Embeds a set of per-channel streams in one pass. Capacity failures are
/// reported per channel; channels not present in `frames` are untouched.
pub fn embed_frames(
    grid: &mut PixelGrid,
    frames: &[(Channel, &[u8])],
    bits_per_channel: u8,
) -> Result<(), ChannelStreamError> {
    for (channel, data) in frames {
        embed_channel_stream(grid, *channel, bits_per_channel, data)?;
    }
    Ok(())
}

/// Extracts all three channel streams, keeping per-channel failures
/// independent: one unreadable channel must not block the others.
pub fn extract_frames(
    grid: &PixelGrid,
    bits_per_channel: u8,
) -> [(Channel, Result<Vec<u8>, ChannelStreamError>); 3] {
    Channel::ALL.map(|channel| {
        (
            channel,
            extract_channel_stream(grid, channel, bits_per_channel),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{create_cover_image, CoverStyle};

    #[test]
    fn test_stream_roundtrip() {
        let mut grid = create_cover_image(64, 64, CoverStyle::Noise);
        let data = b"one stream per channel";

        embed_channel_stream(&mut grid, Channel::Red, 1, data).unwrap();
        let read = extract_channel_stream(&grid, Channel::Red, 1).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_streams_do_not_collide() {
        let mut grid = create_cover_image(64, 64, CoverStyle::Texture);
        embed_frames(
            &mut grid,
            &[
                (Channel::Red, b"first".as_slice()),
                (Channel::Green, b"second".as_slice()),
                (Channel::Blue, b"third".as_slice()),
            ],
            1,
        )
        .unwrap();

        let streams = extract_frames(&grid, 1);
        assert_eq!(streams[0].1.as_ref().unwrap(), b"first");
        assert_eq!(streams[1].1.as_ref().unwrap(), b"second");
        assert_eq!(streams[2].1.as_ref().unwrap(), b"third");
    }

    #[test]
    fn test_roundtrip_4_bits_per_channel() {
        let mut grid = create_cover_image(32, 32, CoverStyle::Noise);
        let data: Vec<u8> = (0..200).map(|i| (i % 256) as u8).collect();

        embed_channel_stream(&mut grid, Channel::Blue, 4, &data).unwrap();
        let read = extract_channel_stream(&grid, Channel::Blue, 4).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_capacity_checked_per_channel() {
        // 16x16 = 256 bits per channel at depth 1; 32 prefix + data bits.
        let mut grid = create_cover_image(16, 16, CoverStyle::Noise);
        let too_big = vec![0xAB; 29]; // 32 + 232 = 264 bits > 256

        let result = embed_channel_stream(&mut grid, Channel::Green, 1, &too_big);
        assert!(matches!(
            result,
            Err(ChannelStreamError::Carrier(
                CarrierError::CapacityExceeded { .. }
            ))
        ));

        // A fitting payload on another channel still works.
        embed_channel_stream(&mut grid, Channel::Red, 1, &[0xCD; 28]).unwrap();
    }

    #[test]
    fn test_garbage_prefix_rejected() {
        // An untouched noise cover yields a pseudo-random 32-bit prefix that
        // almost surely overflows the channel; extraction must fail cleanly.
        let grid = create_cover_image(16, 16, CoverStyle::Noise);
        let result = extract_channel_stream(&grid, Channel::Red, 1);
        assert!(matches!(
            result,
            Err(ChannelStreamError::ImplausibleLength { .. })
        ));
    }

    #[test]
    fn test_prefix_needs_minimum_carrier() {
        let grid = PixelGrid::filled(5, 5, [0xFF; 3]); // 25 bits < 32
        let result = extract_channel_stream(&grid, Channel::Red, 1);
        assert!(matches!(
            result,
            Err(ChannelStreamError::TruncatedPrefix { .. })
        ));
    }

    #[test]
    fn test_empty_stream_roundtrip() {
        let mut grid = create_cover_image(8, 8, CoverStyle::Solid);
        embed_channel_stream(&mut grid, Channel::Green, 1, b"").unwrap();
        let read = extract_channel_stream(&grid, Channel::Green, 1).unwrap();
        assert!(read.is_empty());
    }
}
