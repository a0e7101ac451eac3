//! Encode command - hide a message in a cover image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::encoder::{encode_message, EncodeOptions, PayloadFormat};

use super::{message_or_stdin, CommandExecutor};

/// Hide a message in the least-significant bits of a cover image.
///
/// The message is base64-encoded, wrapped in an LSB1 frame (magic, length,
/// CRC32), and spread across the R, G and B channels of every pixel. The
/// output must be saved losslessly (PNG): any lossy re-encode destroys the
/// hidden data.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Path to the cover image
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Message to hide (reads from stdin if not provided)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Output path for the stego image (PNG)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Skip the CRC32 integrity field (smaller header, no tamper evidence)
    #[arg(long)]
    pub no_crc: bool,

    /// Write the pre-protocol legacy format (bare base64 + null terminator)
    /// instead of an LSB1 frame. For interoperability testing only.
    #[arg(long, conflicts_with = "no_crc")]
    pub legacy: bool,

    /// Low bits used per pixel channel (1 or 4)
    #[arg(short, long, default_value = "1")]
    pub bits_per_channel: u8,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let message = message_or_stdin(self.message.as_deref())?;
        if message.is_empty() {
            anyhow::bail!("Message cannot be empty");
        }

        let options = EncodeOptions {
            use_crc: !self.no_crc,
            format: if self.legacy {
                PayloadFormat::Legacy
            } else {
                PayloadFormat::Framed
            },
            bits_per_channel: self.bits_per_channel,
            verbose: self.verbose,
        };

        let summary = encode_message(&self.cover, &message, &self.output, &options)
            .context("Failed to encode message")?;

        println!("Stego image saved: {}", self.output.display());
        println!("  Format: {}", summary.format);
        println!("  Payload: {} bytes", summary.payload_length);
        match summary.crc32 {
            Some(crc) => println!("  CRC32: {:08X}", crc),
            None => println!("  CRC32: none"),
        }
        println!("  Embedded: {} bits", summary.total_embedded_bits);

        Ok(())
    }
}
