//! Capacity command - report how much an image can carry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::carrier::PixelGrid;
use crate::encoder::calculate_capacity;
use crate::lsb1::CRC_HEADER_LEN;

use super::CommandExecutor;

/// Show the embedding capacity of an image.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Path to the image to inspect
    #[arg(short, long)]
    pub image: PathBuf,

    /// Low bits used per pixel channel (1 or 4)
    #[arg(short, long, default_value = "1")]
    pub bits_per_channel: u8,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let grid = PixelGrid::from_file(&self.image)
            .with_context(|| format!("Failed to load image from {}", self.image.display()))?;

        let single_stream = calculate_capacity(grid.width(), grid.height(), self.bits_per_channel);
        let per_channel = grid.channel_capacity_bits(self.bits_per_channel);

        println!("Capacity of {}", self.image.display());
        println!("  Dimensions: {}x{}", grid.width(), grid.height());
        println!("  Bits per channel: {}", self.bits_per_channel);
        println!(
            "  Single-stream (LSB1): {} bytes total, {} bytes of base64 payload after framing",
            single_stream,
            single_stream.saturating_sub(CRC_HEADER_LEN as u64)
        );
        println!(
            "  Per MRP channel: {} bits ({} frame bytes after the length prefix)",
            per_channel,
            (per_channel / 8).saturating_sub(4)
        );

        Ok(())
    }
}
