//! Atomic replacement of a document file
//!
//! Content goes to a uniquely named temporary file in the target's
//! directory, which is synced and then renamed over the target. Readers see
//! either the old or the new file, never a partial write, and concurrent
//! writers never share a temporary file.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tokio::task;

/// Replace `target` with `content`
///
/// On failure the temporary file is removed and `target` is left as it was.
pub(crate) async fn write_atomic(target: &Path, content: &[u8]) -> io::Result<()> {
    let target = target.to_path_buf();
    let content = content.to_vec();
    task::spawn_blocking(move || write_then_persist(&target, &content))
        .await
        .map_err(io::Error::other)?
}

fn write_then_persist(target: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = temp_file_for(target)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    // Dropping the temporary file on error removes it.
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// A fresh temporary file next to `target`, named after it
fn temp_file_for(target: &Path) -> io::Result<NamedTempFile> {
    let dir = parent_dir(target);
    let mut prefix = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    prefix.push(".");
    Builder::new().prefix(&prefix).suffix(".tmp").tempfile_in(dir)
}

fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
