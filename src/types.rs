//! Core types for beacon state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, Result};

/// Suffix distinguishing a context file from the message file of the same key
pub const CONTEXT_SUFFIX: &str = ".json";

/// Opaque publisher identity, safe to use verbatim as a file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Validate a caller-supplied token
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let reason = if key.is_empty() {
            Some("must not be empty")
        } else if key == "." || key == ".." {
            Some("must not be a relative directory name")
        } else if key.contains(['/', '\\', '\0']) {
            Some("must not contain path separators or NUL")
        } else if key.contains(char::is_control) {
            Some("must not contain control characters")
        } else if key.starts_with('.') {
            Some("must not start with '.'")
        } else if key.ends_with(CONTEXT_SUFFIX) {
            Some("must not end with the context suffix")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(BeaconError::InvalidKey { key, reason }),
            None => Ok(Self(key)),
        }
    }

    /// Key for a process id
    pub fn from_pid(pid: u32) -> Self {
        Self(pid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the message file
    pub fn message_file_name(&self) -> &str {
        &self.0
    }

    /// File name of the context file
    pub fn context_file_name(&self) -> String {
        format!("{}{}", self.0, CONTEXT_SUFFIX)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = BeaconError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<IdentityKey> for String {
    fn from(key: IdentityKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for IdentityKey {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A published status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub key: IdentityKey,
    /// Message text, trimmed of surrounding whitespace
    pub message: String,
}

impl StateEntry {
    pub fn new(key: IdentityKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }

    /// Render as a `key<TAB>message` list line
    pub fn to_line(&self) -> String {
        format!("{}\t{}\n", self.key, self.message)
    }
}
