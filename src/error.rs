//! Error types for beacon operations

/// All errors that can occur while publishing, listing or clearing beacons.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    // Configuration
    #[error("no usable cache directory: {0}")]
    Config(String),

    // Identity
    #[error("invalid identity key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    // Storage
    /// Paths are carried by the `fs_err` message.
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to serialize context: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no context recorded for {key}")]
    ContextNotFound { key: String },

    // Context sources
    #[error("{0}")]
    Environment(&'static str),

    #[error("unexpected context query output: {0}")]
    Format(String),

    #[error("command `{program}` failed: {message}")]
    Command { program: String, message: String },

    // Display
    #[error("invalid template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
