//! Command execution abstraction for context queries.
//!
//! `CommandExecutor` is the seam context sources use to run external programs.
//! `SystemExecutor` spawns the program directly; tests substitute scripted doubles.

use std::process::Command;

use crate::error::{BeaconError, Result};

/// Run a program and return its stdout
pub trait CommandExecutor {
    /// Fails on spawn failure or non-zero exit
    fn execute(&self, program: &str, args: &[&str]) -> Result<Vec<u8>>;
}

/// Production executor using `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<Vec<u8>> {
        tracing::debug!(program, ?args, "executing");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| BeaconError::Command {
                program: program.to_string(),
                message: format!("failed to execute: {}", e),
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BeaconError::Command {
                program: program.to_string(),
                message: format!("{} ({})", stderr.trim(), output.status),
            })
        }
    }
}
