//! Pixel grid access for LSB embedding.
//!
//! A [`PixelGrid`] is a row-major rectangular array of RGB triples loaded
//! from (and saved to) a lossless image. The codec mutates it in place
//! during embedding and reads it untouched during extraction; it is never
//! resized here.
//!
//! Two addressing modes exist over the same grid:
//! - single-channel: all bits go into one color channel's low bits
//!   (the per-channel protocol),
//! - interleaved: every pixel contributes one value per color channel,
//!   R then G then B, before advancing to the next pixel (the
//!   single-stream protocol).

use std::fmt;
use std::path::Path;

use image::{DynamicImage, GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bits::chunk_bits;

/// Errors that can occur while loading, saving, or addressing a pixel grid.
#[derive(Error, Debug)]
pub enum CarrierError {
    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("Image save error: {0}")]
    ImageSave(String),

    #[error("Carrier too small: need {needed} bits, have capacity for {available}")]
    CapacityExceeded { needed: u64, available: u64 },

    #[error("Unsupported bit depth {0}: only 1 or 4 bits per channel are supported")]
    UnsupportedBitDepth(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A color channel of the pixel grid.
///
/// Serializes as the single letter used on the wire (`"R"`, `"G"`, `"B"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "B")]
    Blue,
}

impl Channel {
    /// All channels in raster order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Index of this channel within an RGB triple.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// The wire letter for this channel.
    pub fn letter(self) -> char {
        match self {
            Channel::Red => 'R',
            Channel::Green => 'G',
            Channel::Blue => 'B',
        }
    }

    /// Parses a wire letter (case-sensitive).
    pub fn from_letter(letter: &str) -> Option<Channel> {
        match letter {
            "R" => Some(Channel::Red),
            "G" => Some(Channel::Green),
            "B" => Some(Channel::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Validates the bits-per-channel parameter shared by both protocols.
pub fn check_bit_depth(bits_per_channel: u8) -> Result<(), CarrierError> {
    match bits_per_channel {
        1 | 4 => Ok(()),
        other => Err(CarrierError::UnsupportedBitDepth(other)),
    }
}

/// A row-major grid of RGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl PixelGrid {
    /// Creates a grid filled with a single color.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    /// Loads a grid from an image file. Alpha is discarded; the codec only
    /// ever touches the three color channels.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CarrierError> {
        let image = image::open(path).map_err(|e| CarrierError::ImageLoad(e.to_string()))?;
        Ok(Self::from_image(&image))
    }

    /// Converts a decoded image into a grid.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let rgb = image.to_rgb8();
        let pixels = rgb.pixels().map(|p| p.0).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Saves the grid as a lossless image. The output must stay lossless:
    /// any re-encoding that perturbs color values destroys embedded data.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CarrierError> {
        let flat: Vec<u8> = self.pixels.iter().flatten().copied().collect();
        let buffer = RgbImage::from_raw(self.width, self.height, flat)
            .expect("pixel buffer matches grid dimensions");
        buffer
            .save(path)
            .map_err(|e| CarrierError::ImageSave(e.to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        self.pixels[(y * self.width + x) as usize] = rgb;
    }

    /// Bits available in one color channel at the given depth.
    pub fn channel_capacity_bits(&self, bits_per_channel: u8) -> u64 {
        (self.width as u64) * (self.height as u64) * (bits_per_channel as u64)
    }

    /// Bits available across all three color channels interleaved.
    pub fn interleaved_capacity_bits(&self, bits_per_channel: u8) -> u64 {
        self.channel_capacity_bits(bits_per_channel) * 3
    }

    /// Writes a bit sequence into one color channel's low bits, row-major.
    ///
    /// Capacity is checked before any pixel is touched, so a failed write
    /// leaves the grid unmodified.
    pub fn write_channel(
        &mut self,
        channel: Channel,
        bits_per_channel: u8,
        bits: &[u8],
    ) -> Result<(), CarrierError> {
        check_bit_depth(bits_per_channel)?;
        let available = self.channel_capacity_bits(bits_per_channel);
        if bits.len() as u64 > available {
            return Err(CarrierError::CapacityExceeded {
                needed: bits.len() as u64,
                available,
            });
        }

        let index = channel.index();
        let mask = (1u8 << bits_per_channel) - 1;
        for (pixel, window) in self
            .pixels
            .iter_mut()
            .zip(chunk_bits(bits, bits_per_channel as usize))
        {
            let value = pack_window(&window);
            pixel[index] = (pixel[index] & !mask) | value;
        }
        Ok(())
    }

    /// Reads `bit_count` bits back out of one color channel, starting at
    /// the given pixel offset. The last pixel read may contribute unused
    /// high bits; the result is truncated to exactly `bit_count` entries
    /// (fewer if the grid ends first).
    pub fn read_channel(
        &self,
        channel: Channel,
        bits_per_channel: u8,
        bit_count: usize,
        start_pixel: usize,
    ) -> Result<Vec<u8>, CarrierError> {
        check_bit_depth(bits_per_channel)?;
        let index = channel.index();
        let mask = (1u8 << bits_per_channel) - 1;
        let pixels_needed = bit_count.div_ceil(bits_per_channel as usize);

        let mut bits = Vec::with_capacity(pixels_needed * bits_per_channel as usize);
        for pixel in self.pixels.iter().skip(start_pixel).take(pixels_needed) {
            push_value_bits(&mut bits, pixel[index] & mask, bits_per_channel);
        }
        bits.truncate(bit_count);
        Ok(bits)
    }

    /// Writes a bit sequence across all three color channels: every pixel
    /// consumes one value per channel (R, then G, then B) before the walk
    /// advances to the next pixel.
    pub fn write_interleaved(
        &mut self,
        bits_per_channel: u8,
        bits: &[u8],
    ) -> Result<(), CarrierError> {
        check_bit_depth(bits_per_channel)?;
        let available = self.interleaved_capacity_bits(bits_per_channel);
        if bits.len() as u64 > available {
            return Err(CarrierError::CapacityExceeded {
                needed: bits.len() as u64,
                available,
            });
        }

        let mask = (1u8 << bits_per_channel) - 1;
        let windows = chunk_bits(bits, bits_per_channel as usize);
        let mut cursor = windows.iter();
        'outer: for pixel in self.pixels.iter_mut() {
            for index in 0..3 {
                match cursor.next() {
                    Some(window) => {
                        let value = pack_window(window);
                        pixel[index] = (pixel[index] & !mask) | value;
                    }
                    None => break 'outer,
                }
            }
        }
        Ok(())
    }

    /// Reads `bit_count` bits from the interleaved stream.
    pub fn read_interleaved(
        &self,
        bits_per_channel: u8,
        bit_count: usize,
    ) -> Result<Vec<u8>, CarrierError> {
        check_bit_depth(bits_per_channel)?;
        let mask = (1u8 << bits_per_channel) - 1;

        let mut bits = Vec::with_capacity(bit_count + bits_per_channel as usize * 3);
        'outer: for pixel in self.pixels.iter() {
            for index in 0..3 {
                if bits.len() >= bit_count {
                    break 'outer;
                }
                push_value_bits(&mut bits, pixel[index] & mask, bits_per_channel);
            }
        }
        bits.truncate(bit_count);
        Ok(bits)
    }
}

/// Packs one chunked window of bits into a channel value, MSB-first.
fn pack_window(window: &[u8]) -> u8 {
    window.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1))
}

/// Pushes the low `width` bits of `value`, MSB-first.
fn push_value_bits(bits: &mut Vec<u8>, value: u8, width: u8) {
    for shift in (0..width).rev() {
        bits.push((value >> shift) & 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bits_to_bytes_msb, bytes_to_bits_msb};

    fn test_grid(width: u32, height: u32) -> PixelGrid {
        let mut grid = PixelGrid::filled(width, height, [0, 0, 0]);
        for y in 0..height {
            for x in 0..width {
                grid.set_pixel(
                    x,
                    y,
                    [
                        ((x * 17) % 256) as u8,
                        ((y * 23) % 256) as u8,
                        (((x + y) * 31) % 256) as u8,
                    ],
                );
            }
        }
        grid
    }

    #[test]
    fn test_capacity_arithmetic() {
        let grid = test_grid(100, 50);
        assert_eq!(grid.channel_capacity_bits(1), 5000);
        assert_eq!(grid.channel_capacity_bits(4), 20000);
        assert_eq!(grid.interleaved_capacity_bits(1), 15000);
    }

    #[test]
    fn test_channel_roundtrip_1bit() {
        let mut grid = test_grid(40, 40);
        let data = b"per-channel stream";
        let bits = bytes_to_bits_msb(data);

        grid.write_channel(Channel::Green, 1, &bits).unwrap();
        let read = grid
            .read_channel(Channel::Green, 1, bits.len(), 0)
            .unwrap();
        assert_eq!(bits_to_bytes_msb(&read), data);
    }

    #[test]
    fn test_channel_roundtrip_4bit() {
        let mut grid = test_grid(20, 20);
        let data = b"denser";
        let bits = bytes_to_bits_msb(data);

        grid.write_channel(Channel::Blue, 4, &bits).unwrap();
        let read = grid.read_channel(Channel::Blue, 4, bits.len(), 0).unwrap();
        assert_eq!(bits_to_bytes_msb(&read), data);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut grid = test_grid(30, 30);
        let red = bytes_to_bits_msb(b"red payload");
        let green = bytes_to_bits_msb(b"green payload");

        grid.write_channel(Channel::Red, 1, &red).unwrap();
        grid.write_channel(Channel::Green, 1, &green).unwrap();

        let r = grid.read_channel(Channel::Red, 1, red.len(), 0).unwrap();
        let g = grid
            .read_channel(Channel::Green, 1, green.len(), 0)
            .unwrap();
        assert_eq!(bits_to_bytes_msb(&r), b"red payload");
        assert_eq!(bits_to_bytes_msb(&g), b"green payload");
    }

    #[test]
    fn test_read_channel_start_pixel() {
        let mut grid = test_grid(16, 16);
        let bits = bytes_to_bits_msb(&[0xDE, 0xAD]);
        grid.write_channel(Channel::Red, 1, &bits).unwrap();

        // Skip the first byte's 8 pixels.
        let tail = grid.read_channel(Channel::Red, 1, 8, 8).unwrap();
        assert_eq!(bits_to_bytes_msb(&tail), vec![0xAD]);
    }

    #[test]
    fn test_interleaved_roundtrip() {
        let mut grid = test_grid(25, 25);
        let data = b"interleaved across R, G and B";
        let bits = bytes_to_bits_msb(data);

        grid.write_interleaved(1, &bits).unwrap();
        let read = grid.read_interleaved(1, bits.len()).unwrap();
        assert_eq!(bits_to_bytes_msb(&read), data);
    }

    #[test]
    fn test_interleaved_walks_channels_first() {
        let mut grid = PixelGrid::filled(2, 1, [0xFE; 3]);
        // Three bits land in pixel 0's R, G, B; the fourth in pixel 1's R.
        grid.write_interleaved(1, &[1, 0, 1, 1]).unwrap();
        assert_eq!(grid.pixel(0, 0), [0xFF, 0xFE, 0xFF]);
        assert_eq!(grid.pixel(1, 0), [0xFF, 0xFE, 0xFE]);
    }

    #[test]
    fn test_capacity_exceeded_leaves_grid_untouched() {
        let mut grid = test_grid(4, 4);
        let before = grid.clone();
        let bits = vec![1u8; 17]; // one over the 16-bit channel capacity

        let result = grid.write_channel(Channel::Red, 1, &bits);
        assert!(matches!(
            result,
            Err(CarrierError::CapacityExceeded {
                needed: 17,
                available: 16
            })
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_bad_bit_depth_rejected() {
        let mut grid = test_grid(4, 4);
        let result = grid.write_channel(Channel::Red, 3, &[1]);
        assert!(matches!(result, Err(CarrierError::UnsupportedBitDepth(3))));
    }

    #[test]
    fn test_channel_letters() {
        assert_eq!(Channel::from_letter("G"), Some(Channel::Green));
        assert_eq!(Channel::from_letter("g"), None);
        assert_eq!(Channel::Blue.to_string(), "B");
        assert_eq!(Channel::Red.index(), 0);
    }
}
