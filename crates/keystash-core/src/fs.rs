//! Filesystem utilities for atomic record writes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// Create `dir` (and parents), owner-only on Unix.
pub fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Write `data` to a fresh, uniquely named temp file in `dir` and fsync it.
///
/// The temp name starts with a dot and ends in `.tmp` so directory scans can
/// skip it. On failure the partial temp file is removed.
pub fn write_temp(dir: &Path, stem: &str, data: &[u8]) -> io::Result<PathBuf> {
    let temp_path = dir.join(format!(".{}.{}.tmp", stem, Uuid::new_v4().simple()));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let result = options.open(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = result {
        remove_temp(&temp_path);
        return Err(err);
    }
    Ok(temp_path)
}

/// Publish `temp_path` at `destination` only if nothing exists there yet.
///
/// Uses `hard_link`, which fails with `AlreadyExists` atomically, so two
/// concurrent callers can never both succeed. The temp file is removed in
/// every case.
///
/// # Errors
///
/// Fails if the link fails, or if the parent directory cannot be flushed
/// afterwards. In the second case the record is already visible at
/// `destination` even though an error is returned.
pub fn persist_new(temp_path: &Path, destination: &Path) -> io::Result<()> {
    let linked = fs::hard_link(temp_path, destination);
    remove_temp(temp_path);
    linked?;
    if let Some(parent) = destination.parent() {
        sync_dir(parent)?;
    }
    Ok(())
}

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
///
/// # Errors
///
/// Returns an error if the rename fails even after the fallback attempt.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        // Best-effort replace on platforms where rename fails if target exists.
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            remove_temp(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    if let Some(parent) = destination.parent() {
        sync_dir(parent)?;
    }
    Ok(())
}

/// Best-effort removal of a temp file. A leftover is harmless to readers
/// but is reported.
fn remove_temp(temp_path: &Path) {
    if let Err(err) = fs::remove_file(temp_path) {
        warn!(path = %temp_path.display(), error = %err, "failed to remove temp file");
    }
}

/// Flush directory entries so a rename/link/unlink survives a crash.
#[cfg(unix)]
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
