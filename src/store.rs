//! Message state store: one file per identity key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::Result;
use crate::file;
use crate::types::{IdentityKey, StateEntry, CONTEXT_SUFFIX};

/// Durable mapping from identity key to message
pub trait StateStore {
    /// Create or replace the message for `key`
    fn write(&self, key: &IdentityKey, message: &str) -> Result<()>;

    /// Remove the message for `key`; absent is success
    fn delete(&self, key: &IdentityKey) -> Result<()>;

    /// Every readable entry, in directory order
    fn list(&self) -> Result<Vec<StateEntry>>;
}

/// File-backed state store rooted at a single flat directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Store in the resolved cache directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(file::base_dir()?))
    }

    /// Store in a custom directory
    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &IdentityKey) -> PathBuf {
        self.base_dir.join(key.message_file_name())
    }
}

impl StateStore for FileStore {
    fn write(&self, key: &IdentityKey, message: &str) -> Result<()> {
        let path = self.path_for(key);
        tracing::debug!(key = %key, path = %path.display(), "writing state");
        file::write_atomic(&path, message.as_bytes())
    }

    fn delete(&self, key: &IdentityKey) -> Result<()> {
        tracing::debug!(key = %key, "deleting state");
        file::remove_if_exists(&self.path_for(key))
    }

    fn list(&self) -> Result<Vec<StateEntry>> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut states = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(CONTEXT_SUFFIX) || file::is_temp_name(&name) {
                continue;
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }
            let Ok(key) = IdentityKey::new(name.as_str()) else {
                continue;
            };

            // Entries may vanish or hold non-text between listing and reading
            match fs::read_to_string(entry.path()) {
                Ok(content) => states.push(StateEntry::new(key, content.trim())),
                Err(e) => {
                    tracing::debug!(entry = %name, error = %e, "skipping unreadable state");
                }
            }
        }

        tracing::debug!(count = states.len(), "listed states");
        Ok(states)
    }
}
