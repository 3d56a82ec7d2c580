//! File operations shared by the state and context stores

use std::env;
use std::ffi::OsString;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::{BeaconError, Result};

/// Subdirectory of the cache root holding beacon files
pub const DIR_NAME: &str = "beacon";

/// Environment variable overriding the cache root
pub const CACHE_ROOT_VAR: &str = "XDG_CACHE_HOME";

/// Prefix of in-flight temp files; never a valid key
const TEMP_PREFIX: &str = ".beacon-";

/// Resolve the base directory for beacon files. Does not create it.
pub fn base_dir() -> Result<PathBuf> {
    resolve(env::var_os(CACHE_ROOT_VAR), dirs::cache_dir())
}

/// Pick the override when set and non-empty, otherwise the platform cache dir
pub fn resolve(cache_root: Option<OsString>, platform_cache: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = cache_root.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root).join(DIR_NAME));
    }

    platform_cache
        .map(|dir| dir.join(DIR_NAME))
        .ok_or_else(|| {
            BeaconError::Config(format!(
                "{} is unset and no platform cache directory exists",
                CACHE_ROOT_VAR
            ))
        })
}

/// Replace `path` with `contents` via temp file + rename.
/// Creates the parent directory (and missing ancestors) first.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| annotate(e, "create temp file in", dir))?;

    tmp.write_all(contents)
        .and_then(|_| tmp.flush())
        .map_err(|e| annotate(e, "write temp file for", path))?;

    tmp.persist(path)
        .map_err(|e| annotate(e.error, "persist", path))?;

    Ok(())
}

/// Remove a file; a missing file is success
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Whether a directory entry name belongs to an in-flight write
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with('.')
}

fn annotate(err: io::Error, action: &str, path: &Path) -> BeaconError {
    BeaconError::Storage(io::Error::new(
        err.kind(),
        format!("failed to {} `{}`: {}", action, path.display(), err),
    ))
}
