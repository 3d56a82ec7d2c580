//! Context store: `<key>.json` beside the message file

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs_err as fs;

use super::Context;
use crate::error::{BeaconError, Result};
use crate::file;
use crate::types::IdentityKey;

/// Durable mapping from identity key to serialized context
pub trait ContextStore {
    /// Serialize and persist `context` for `key`
    fn write(&self, key: &IdentityKey, context: &dyn Context) -> Result<()>;

    /// Remove the context for `key`; absent is success
    fn delete(&self, key: &IdentityKey) -> Result<()>;

    /// Raw persisted bytes
    fn read(&self, key: &IdentityKey) -> Result<Vec<u8>>;
}

/// File-backed context store sharing the state store's directory
#[derive(Debug, Clone)]
pub struct FileContextStore {
    base_dir: PathBuf,
}

impl FileContextStore {
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(file::base_dir()?))
    }

    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &IdentityKey) -> PathBuf {
        self.base_dir.join(key.context_file_name())
    }
}

impl ContextStore for FileContextStore {
    fn write(&self, key: &IdentityKey, context: &dyn Context) -> Result<()> {
        // Serialize before touching the filesystem
        let data = context.to_json()?;
        tracing::debug!(key = %key, kind = context.kind(), "writing context");
        file::write_atomic(&self.path_for(key), &data)
    }

    fn delete(&self, key: &IdentityKey) -> Result<()> {
        tracing::debug!(key = %key, "deleting context");
        file::remove_if_exists(&self.path_for(key))
    }

    fn read(&self, key: &IdentityKey) -> Result<Vec<u8>> {
        match fs::read(self.path_for(key)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BeaconError::ContextNotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
