//! Decode command - extract a hidden message from an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::decoder::{extract_from_image, DecodeOptions};

use super::CommandExecutor;

/// Extract a hidden message from a stego image.
///
/// Tries the framed LSB1 protocol first, then falls back to the legacy
/// unframed format. A CRC mismatch is a hard failure: corrupted payloads
/// are never printed as if they were intact.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Path to the stego image
    #[arg(short, long)]
    pub image: PathBuf,

    /// Low bits read per pixel channel (must match the encode)
    #[arg(short, long, default_value = "1")]
    pub bits_per_channel: u8,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let options = DecodeOptions {
            bits_per_channel: self.bits_per_channel,
            verbose: self.verbose,
        };

        let extracted = extract_from_image(&self.image, &options)
            .with_context(|| format!("Failed to decode {}", self.image.display()))?;

        println!("{}", extracted.message);

        eprintln!("Detected format: {}", extracted.format);
        if let Some(header) = &extracted.header {
            eprintln!(
                "  Frame: version {}, {} payload bytes, crc {}",
                header.version,
                header.payload_length,
                match header.crc32 {
                    Some(crc) => format!("{:08X}", crc),
                    None => "absent".to_string(),
                }
            );
        }

        Ok(())
    }
}
