//! MRP verify command - classify an externally supplied frame triple.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::mrp::verify_frames;

use super::CommandExecutor;

/// Verify a triple of MRP frame JSON documents without an image.
///
/// Useful when frames have been extracted or logged elsewhere: the triple
/// is classified exactly like an embedded image (including the parity
/// recovery check), but nothing is decoded or written.
#[derive(Args, Debug)]
pub struct MrpVerifyCommand {
    /// Path to the R (message) frame JSON
    #[arg(short = 'r', long)]
    pub r_frame: PathBuf,

    /// Path to the G (metadata) frame JSON
    #[arg(short = 'g', long)]
    pub g_frame: PathBuf,

    /// Path to the B (sidecar) frame JSON
    #[arg(short = 'b', long)]
    pub b_frame: PathBuf,
}

impl CommandExecutor for MrpVerifyCommand {
    fn execute(&self) -> Result<()> {
        let read = |path: &PathBuf| {
            std::fs::read(path)
                .with_context(|| format!("Failed to read frame from {}", path.display()))
        };
        let (r, g, b) = (
            read(&self.r_frame)?,
            read(&self.g_frame)?,
            read(&self.b_frame)?,
        );

        let report = verify_frames(&r, &g, &b);
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }
}
