//! Filesystem helpers.
//!
//! Thin wrappers over `std::fs` plus [`write_atomic`], which every store uses
//! so that a crash mid-write never leaves a half-written artifact under its
//! final name.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{IoError, IoResult};

/// Returns `true` if `path` names an existing regular file.
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Returns `true` if `path` names an existing directory.
pub fn folder_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_dir()
}

/// Removes `path` and everything below it.
///
/// If an entry cannot be removed the error is returned and whatever was
/// already deleted stays deleted.
pub fn delete_directory_recursively<P: AsRef<Path>>(path: P) -> IoResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::remove_dir_all(path)?;
    tracing::debug!(path = %path.display(), "removed directory tree");
    Ok(())
}

/// Creates the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> IoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes a whole file through a temporary sibling and renames it into place.
///
/// `write` receives a buffered writer; if it fails, or any flush/sync fails,
/// the temporary file is discarded and `path` is left untouched.
pub fn write_atomic<P, F>(path: P, write: F) -> IoResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> IoResult<()>,
{
    let path = path.as_ref();
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| IoError::Io(e.error))?;
    Ok(())
}
