//! MRP decode command - extract and classify an MRP image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::mrp::{decode_mrp, IntegrityStatus, MrpOptions};

use super::CommandExecutor;

/// Extract message and metadata from an MRP image.
///
/// Reports the integrity outcome alongside the data: `ok` means all three
/// channels verified, `degraded` means the parity sidecar itself was
/// corrupt (the data is fine but can no longer be cross-checked), and
/// `recovered` means one data channel was rebuilt from parity. Two
/// simultaneous erasures fail the command: no partial message is printed.
#[derive(Args, Debug)]
pub struct MrpDecodeCommand {
    /// Path to the stego image
    #[arg(short, long)]
    pub image: PathBuf,

    /// Low bits read per pixel channel (must match the encode)
    #[arg(short, long, default_value = "1")]
    pub bits_per_channel: u8,

    /// Emit the full result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommandExecutor for MrpDecodeCommand {
    fn execute(&self) -> Result<()> {
        let options = MrpOptions {
            bits_per_channel: self.bits_per_channel,
            verbose: self.verbose,
        };

        let decoded = decode_mrp(&self.image, &options)
            .with_context(|| format!("Failed to decode {}", self.image.display()))?;

        if self.json {
            let out = json!({
                "message": decoded.message,
                "metadata": decoded.metadata,
                "integrity": decoded.integrity,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            println!("{}", decoded.message);
            eprintln!("Metadata: {}", decoded.metadata);
        }

        show_integrity_status(decoded.integrity.status);

        Ok(())
    }
}

/// Shows the integrity outcome to the user.
fn show_integrity_status(status: IntegrityStatus) {
    match status {
        IntegrityStatus::Ok => {
            eprintln!("Integrity: OK (all channels verified)");
        }
        IntegrityStatus::Degraded => {
            eprintln!("WARNING: parity sidecar corrupt!");
            eprintln!("         Message and metadata verified, but further damage");
            eprintln!("         would now be unrecoverable. Re-encode this image.");
        }
        IntegrityStatus::Recovered => {
            eprintln!("NOTICE: one channel was corrupt and has been recovered");
            eprintln!("        from parity. Re-encode this image to restore full");
            eprintln!("        protection.");
        }
        // decode_mrp raises on unrecoverable corruption; this arm exists
        // only for exhaustiveness.
        IntegrityStatus::Unrecoverable => {
            eprintln!("ERROR: unrecoverable corruption");
        }
    }
}
