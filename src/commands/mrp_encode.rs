//! MRP encode command - embed message + metadata with parity protection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::mrp::{encode_mrp, MrpOptions};

use super::{message_or_stdin, CommandExecutor};

/// Embed a message and its metadata with single-erasure protection.
///
/// Writes three independent frames: the message into the red channel, the
/// metadata (a JSON document) into green, and a parity sidecar into blue.
/// If exactly one data channel is later damaged, decode can rebuild it.
#[derive(Args, Debug)]
pub struct MrpEncodeCommand {
    /// Path to the cover image
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Message to hide (reads from stdin if not provided)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Metadata as inline JSON (mutually exclusive with --metadata-file)
    #[arg(long, conflicts_with = "metadata_file", default_value = "{}")]
    pub metadata: String,

    /// Read metadata JSON from a file
    #[arg(long)]
    pub metadata_file: Option<PathBuf>,

    /// Output path for the stego image (PNG)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Low bits used per pixel channel (1 or 4)
    #[arg(short, long, default_value = "1")]
    pub bits_per_channel: u8,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for MrpEncodeCommand {
    fn execute(&self) -> Result<()> {
        let message = message_or_stdin(self.message.as_deref())?;
        if message.is_empty() {
            anyhow::bail!("Message cannot be empty");
        }

        let metadata_text = match &self.metadata_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read metadata from {}", path.display()))?,
            None => self.metadata.clone(),
        };
        let metadata: Value =
            serde_json::from_str(&metadata_text).context("Metadata is not valid JSON")?;

        let options = MrpOptions {
            bits_per_channel: self.bits_per_channel,
            verbose: self.verbose,
        };

        let summary = encode_mrp(&self.cover, &message, &metadata, &self.output, &options)
            .context("Failed to encode MRP image")?;

        println!("MRP stego image saved: {}", self.output.display());
        println!(
            "  R (message): {} payload bytes, crc {}",
            summary.message_payload_bytes, summary.crc_r
        );
        println!(
            "  G (metadata): {} payload bytes, crc {}",
            summary.metadata_payload_bytes, summary.crc_g
        );
        println!("  B (parity): {} bytes, scheme xor", summary.parity_bytes);
        println!(
            "  Embedded bits: R={} G={} B={}",
            summary.embedded_bits[0], summary.embedded_bits[1], summary.embedded_bits[2]
        );

        Ok(())
    }
}
