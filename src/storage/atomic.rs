//! Locked, atomic file replacement
//!
//! Writers take an exclusive lock on `<file>.lock`, write `<file>.tmp`, sync
//! it, then rename it over the target. The lock lives in its own file so the
//! rename does not drop it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Exclusive lock guarding writes to one file; released on drop
pub(crate) struct FileLock {
    _file: File,
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

/// Block until the exclusive write lock for `path` is held.
///
/// Creates the parent directory if needed.
pub(crate) fn lock(path: &Path) -> io::Result<FileLock> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(sibling(path, ".lock"))?;
    file.lock_exclusive()?;
    Ok(FileLock { _file: file })
}

/// Replace `path` with `content` via temp file and rename.
///
/// The caller holds the lock from [`lock`].
pub(crate) fn replace(_lock: &FileLock, path: &Path, content: &str) -> io::Result<()> {
    let temp_path = sibling(path, ".tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.sync_all()?;
    std::fs::rename(&temp_path, path)
}

/// Lock, then replace `path` with `content`
pub(crate) fn write_locked(path: &Path, content: &str) -> io::Result<()> {
    let guard = lock(path)?;
    replace(&guard, path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        write_locked(&path, "a = \"1\"\n").unwrap();
        write_locked(&path, "a = \"2\"\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a = \"2\"\n");
        assert!(!dir.path().join("nested").join("settings.toml.tmp").exists());
        assert!(dir.path().join("nested").join("settings.toml.lock").exists());
    }

    #[test]
    fn test_concurrent_writers_never_interleave() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let content = format!("writer = {}\n", i).repeat(1000);
                    for _ in 0..10 {
                        write_locked(&path, &content).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.lines().next().unwrap().to_string();
        assert_eq!(content.lines().count(), 1000);
        assert!(content.lines().all(|line| line == first));
    }
}
