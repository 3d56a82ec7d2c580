//! tmux pane context

use std::env;

use serde::{Deserialize, Serialize};

use super::{CommandExecutor, Context, ContextSource, SystemExecutor};
use crate::error::{BeaconError, Result};

/// Set by tmux inside every pane it manages
pub const TMUX_ENV: &str = "TMUX";

const DISPLAY_FORMAT: &str = "#{session_name}\t#{window_index}\t#{pane_index}\t#{pane_id}";

/// Session, window and pane of the emitting shell.
/// Field order is the canonical JSON order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxContext {
    pub session_name: String,
    pub window_index: u32,
    pub pane_index: u32,
    pub pane_id: String,
}

impl TmuxContext {
    /// Parse `display-message` output: four tab-separated fields
    pub fn parse(output: &str) -> Result<Self> {
        let parts: Vec<&str> = output.trim().split('\t').collect();
        let [session, window, pane, pane_id] = parts.as_slice() else {
            return Err(BeaconError::Format(format!(
                "expected 4 tab-separated fields, got {}",
                parts.len()
            )));
        };

        let window_index = window
            .parse::<u32>()
            .map_err(|_| BeaconError::Format(format!("invalid window index {:?}", window)))?;
        let pane_index = pane
            .parse::<u32>()
            .map_err(|_| BeaconError::Format(format!("invalid pane index {:?}", pane)))?;

        Ok(Self {
            session_name: session.to_string(),
            window_index,
            pane_index,
            pane_id: pane_id.to_string(),
        })
    }
}

impl Context for TmuxContext {
    fn kind(&self) -> &'static str {
        "tmux"
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Queries the running tmux server for the current pane
pub struct TmuxSource {
    executor: Box<dyn CommandExecutor>,
    /// Value of `$TMUX` captured at construction
    marker: Option<String>,
}

impl TmuxSource {
    pub fn new() -> Self {
        Self::with_executor(Box::new(SystemExecutor), env::var(TMUX_ENV).ok())
    }

    pub fn with_executor(executor: Box<dyn CommandExecutor>, marker: Option<String>) -> Self {
        Self { executor, marker }
    }
}

impl Default for TmuxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextSource for TmuxSource {
    fn get_context(&self) -> Result<Box<dyn Context>> {
        if self.marker.as_deref().map_or(true, str::is_empty) {
            return Err(BeaconError::Environment("not running inside tmux"));
        }

        let output = self
            .executor
            .execute("tmux", &["display-message", "-p", DISPLAY_FORMAT])?;
        let output = String::from_utf8(output)
            .map_err(|_| BeaconError::Format("tmux output is not UTF-8".to_string()))?;

        Ok(Box::new(TmuxContext::parse(&output)?))
    }
}
