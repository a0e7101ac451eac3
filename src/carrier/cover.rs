//! Synthetic cover image generation.
//!
//! Encoding does not require a user-supplied carrier: a cover can be
//! synthesized on demand. Generation is deterministic for a given
//! (width, height, style) triple so tests and repeated runs produce
//! identical carriers. The covers are not security-critical; they just need
//! enough variation to not look suspicious once LSBs are rewritten.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use super::grid::PixelGrid;

/// Visual style of a synthesized cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverStyle {
    /// Full-range pseudo-random RGB noise.
    #[default]
    Noise,
    /// A smooth diagonal gradient with per-pixel jitter.
    Texture,
    /// A single flat color.
    Solid,
}

impl CoverStyle {
    fn label(self) -> &'static str {
        match self {
            CoverStyle::Noise => "noise",
            CoverStyle::Texture => "texture",
            CoverStyle::Solid => "solid",
        }
    }
}

impl fmt::Display for CoverStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CoverStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "noise" => Ok(CoverStyle::Noise),
            "texture" => Ok(CoverStyle::Texture),
            "solid" => Ok(CoverStyle::Solid),
            other => Err(format!(
                "Unknown cover style '{}'. Use: noise, texture, or solid",
                other
            )),
        }
    }
}

/// Creates a deterministic synthetic cover grid.
pub fn create_cover_image(width: u32, height: u32, style: CoverStyle) -> PixelGrid {
    let mut rng = seeded_rng(width, height, style);

    match style {
        CoverStyle::Solid => PixelGrid::filled(width, height, [0x80, 0x80, 0x80]),
        CoverStyle::Noise => {
            let mut grid = PixelGrid::filled(width, height, [0, 0, 0]);
            for y in 0..height {
                for x in 0..width {
                    grid.set_pixel(x, y, [rng.gen(), rng.gen(), rng.gen()]);
                }
            }
            grid
        }
        CoverStyle::Texture => {
            let mut grid = PixelGrid::filled(width, height, [0, 0, 0]);
            for y in 0..height {
                for x in 0..width {
                    // Diagonal base tone plus a little jitter per channel.
                    let base = ((x * 5 + y * 3) % 200) as u8;
                    let jitter: [i16; 3] = [
                        rng.gen_range(-12..=12),
                        rng.gen_range(-12..=12),
                        rng.gen_range(-12..=12),
                    ];
                    let shade = |offset: u8, j: i16| -> u8 {
                        (base as i16 + offset as i16 + j).clamp(0, 255) as u8
                    };
                    grid.set_pixel(x, y, [shade(30, jitter[0]), shade(20, jitter[1]), shade(40, jitter[2])]);
                }
            }
            grid
        }
    }
}

/// Derives the generator seed from the cover parameters.
fn seeded_rng(width: u32, height: u32, style: CoverStyle) -> ChaCha20Rng {
    let mut hasher = Sha256::new();
    hasher.update(b"pixelveil-cover");
    hasher.update(style.label().as_bytes());
    hasher.update(width.to_be_bytes());
    hasher.update(height.to_be_bytes());
    let seed: [u8; 32] = hasher.finalize().into();
    ChaCha20Rng::from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_is_deterministic() {
        let a = create_cover_image(64, 48, CoverStyle::Noise);
        let b = create_cover_image(64, 48, CoverStyle::Noise);
        assert_eq!(a, b);
    }

    #[test]
    fn test_styles_differ() {
        let noise = create_cover_image(32, 32, CoverStyle::Noise);
        let texture = create_cover_image(32, 32, CoverStyle::Texture);
        assert_ne!(noise, texture);
    }

    #[test]
    fn test_solid_is_flat() {
        let solid = create_cover_image(8, 8, CoverStyle::Solid);
        let first = solid.pixel(0, 0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(solid.pixel(x, y), first);
            }
        }
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("NOISE".parse::<CoverStyle>().unwrap(), CoverStyle::Noise);
        assert_eq!("texture".parse::<CoverStyle>().unwrap(), CoverStyle::Texture);
        assert!("plaid".parse::<CoverStyle>().is_err());
    }
}
