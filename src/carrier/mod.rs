//! Carrier access: pixel grids, channel-level LSB addressing, and
//! synthetic cover generation.

pub mod cover;
pub mod grid;

pub use cover::{create_cover_image, CoverStyle};
pub use grid::{check_bit_depth, CarrierError, Channel, PixelGrid};
