//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor`
//! trait. This provides clean separation of concerns and makes adding new
//! commands easy.

mod capacity;
mod cover;
mod decode;
mod encode;
mod mrp_decode;
mod mrp_encode;
mod mrp_verify;

pub use capacity::CapacityCommand;
pub use cover::CoverCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use mrp_decode::MrpDecodeCommand;
pub use mrp_encode::MrpEncodeCommand;
pub use mrp_verify::MrpVerifyCommand;

use std::io::Read;

use anyhow::{Context, Result};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Resolves a message argument, falling back to stdin when absent.
pub(crate) fn message_or_stdin(message: Option<&str>) -> Result<String> {
    match message {
        Some(m) => Ok(m.to_string()),
        None => {
            eprintln!("Reading message from stdin (Ctrl+D to finish):");
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read message from stdin")?;
            Ok(buffer.trim().to_string())
        }
    }
}
