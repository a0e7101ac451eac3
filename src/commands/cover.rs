//! Cover command - generate a synthetic cover image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::carrier::{create_cover_image, CoverStyle};
use crate::encoder::calculate_capacity;

use super::CommandExecutor;

/// Generate a deterministic synthetic cover image.
///
/// The same width, height, and style always produce the same image, so a
/// cover can be regenerated instead of stored.
#[derive(Args, Debug)]
pub struct CoverCommand {
    /// Output path for the cover image (PNG)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Cover width in pixels
    #[arg(long, default_value = "256")]
    pub width: u32,

    /// Cover height in pixels
    #[arg(long, default_value = "256")]
    pub height: u32,

    /// Cover style: noise, texture, or solid
    #[arg(short, long, default_value = "noise")]
    pub style: String,
}

impl CommandExecutor for CoverCommand {
    fn execute(&self) -> Result<()> {
        let style: CoverStyle = self.style.parse().map_err(anyhow::Error::msg)?;
        let grid = create_cover_image(self.width, self.height, style);

        grid.save(&self.output)
            .with_context(|| format!("Failed to save cover to {}", self.output.display()))?;

        println!("Cover image saved: {}", self.output.display());
        println!("  Size: {}x{} ({})", self.width, self.height, style);
        println!(
            "  Single-stream capacity: {} bytes",
            calculate_capacity(self.width, self.height, 1)
        );
        println!(
            "  Per-channel capacity: {} bits",
            (self.width as u64) * (self.height as u64)
        );

        Ok(())
    }
}
