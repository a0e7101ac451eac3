//! Pixelveil - hide structured data in plain sight
//!
//! A CLI tool for LSB steganography over lossless images, with framed
//! payloads, CRC32 integrity checks, and multi-channel parity recovery.

use anyhow::Result;
use clap::{Parser, Subcommand};

use pixelveil::commands::{
    CapacityCommand, CommandExecutor, CoverCommand, DecodeCommand, EncodeCommand,
    MrpDecodeCommand, MrpEncodeCommand, MrpVerifyCommand,
};

/// Pixelveil - hide structured data in plain sight
///
/// Embeds data in the least-significant bits of lossless images. Messages
/// are framed with a length and CRC32 so corruption is detected, and the
/// multi-channel mode adds a parity sidecar that can heal one damaged
/// channel.
#[derive(Parser)]
#[command(name = "pixelveil")]
#[command(version)]
#[command(about = "LSB steganography with integrity checking and parity recovery")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deterministic synthetic cover image
    Cover(CoverCommand),

    /// Show the embedding capacity of an image
    Capacity(CapacityCommand),

    /// Hide a message in a cover image (single-stream LSB1)
    Encode(EncodeCommand),

    /// Extract a hidden message (LSB1, with legacy fallback)
    Decode(DecodeCommand),

    /// Embed message + metadata with parity protection (MRP)
    #[command(name = "mrp-encode")]
    MrpEncode(MrpEncodeCommand),

    /// Extract and classify an MRP image
    #[command(name = "mrp-decode")]
    MrpDecode(MrpDecodeCommand),

    /// Verify an externally supplied MRP frame triple
    #[command(name = "mrp-verify")]
    MrpVerify(MrpVerifyCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Cover(cmd) => cmd.execute(),
        Commands::Capacity(cmd) => cmd.execute(),
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::MrpEncode(cmd) => cmd.execute(),
        Commands::MrpDecode(cmd) => cmd.execute(),
        Commands::MrpVerify(cmd) => cmd.execute(),
    }
}
