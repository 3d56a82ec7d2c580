//! Configuration for beacon

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::context::ContextKind;

/// Beacon configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Context source attached by `emit` when none is given on the command line
    pub context: Option<ContextKind>,

    /// Default template for the `context` command.
    /// Example: "{{.session_name}}:{{.window_index}}.{{.pane_index}}"
    pub template: Option<String>,
}

impl Config {
    /// Load config from the default file or return defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read config, using defaults");
                return Self::default();
            }
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("beacon").join("config.toml"))
    }
}
