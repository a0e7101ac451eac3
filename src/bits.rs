//! Bit-level plumbing shared by every embedding layer.
//!
//! All payloads travel through the pixel grid as flat bit sequences,
//! MSB-first within each byte. Packing direction matters: an image written
//! with these helpers can only be read back with them.

/// Expands bytes into individual bits, most significant bit first.
///
/// The result always has exactly `8 * bytes.len()` entries, each 0 or 1.
pub fn bytes_to_bits_msb(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Packs bits back into bytes, most significant bit first.
///
/// An incomplete final group is zero-padded on the low-order side, so the
/// caller is responsible for requesting the exact bit count it wrote.
/// Never fails.
pub fn bits_to_bytes_msb(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for group in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in group.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

/// Splits a bit sequence into fixed-size windows, zero-padding the last
/// window if it comes up short.
///
/// Used when embedding at more than one bit per pixel channel: each window
/// becomes the low bits of one channel value.
pub fn chunk_bits(bits: &[u8], size: usize) -> Vec<Vec<u8>> {
    assert!(size > 0, "chunk size must be non-zero");
    bits.chunks(size)
        .map(|window| {
            let mut chunk = window.to_vec();
            chunk.resize(size, 0);
            chunk
        })
        .collect()
}
