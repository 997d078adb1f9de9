//! Atomic settings file writes.
//!
//! A settings file is either the old document or the new one, never a torn
//! mix: bytes go to a temp file in the same directory which is then renamed
//! over the target. Windows refuses to rename over an existing file, so there
//! the old file is moved aside to `.bak` first and restored if the swap fails.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilePrivacy {
    /// Leave permissions to the process umask.
    Inherit,
    /// Owner read/write only (0o600 on Unix).
    #[default]
    OwnerOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct PersistOptions {
    /// `fsync` the temp file before the rename.
    pub sync: bool,
    pub privacy: FilePrivacy,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            sync: true,
            privacy: FilePrivacy::OwnerOnly,
        }
    }
}

/// Restore `path` from `path.bak` left behind by a write interrupted mid-swap.
///
/// Returns true if a backup was restored.
pub fn recover_interrupted_write(path: &Path) -> bool {
    let backup = path.with_extension("bak");
    if path.exists() || !backup.exists() {
        return false;
    }
    match fs::rename(&backup, path) {
        Ok(()) => {
            tracing::warn!(
                path = %path.display(),
                "Restored settings file from interrupted write"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                "Failed to restore settings backup: {e}"
            );
            false
        }
    }
}

pub fn persist_atomically(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: PersistOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if options.sync {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup = path.with_extension("bak");
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;
        if let Err(swap_err) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(swap_err.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            tracing::warn!(
                path = %backup.display(),
                "Failed to remove settings backup after write: {e}"
            );
        }
    }

    apply_privacy(path, options.privacy)
}

#[cfg(unix)]
fn apply_privacy(path: &Path, privacy: FilePrivacy) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if matches!(privacy, FilePrivacy::OwnerOnly) {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_privacy(_path: &Path, _privacy: FilePrivacy) -> io::Result<()> {
    Ok(())
}

/// Create `dir` (and parents) and, if we own it, tighten it to 0o700.
pub fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let metadata = fs::metadata(dir)?;
        // SAFETY: getuid has no preconditions and cannot fail.
        let our_uid = unsafe { libc::getuid() };
        if metadata.uid() == our_uid {
            let mode = metadata.permissions().mode() & 0o777;
            if mode & 0o077 != 0 {
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }
    }
    Ok(())
}
