//! Atomic file replacement for tracker documents.
//!
//! Writes go to a scoped temp file in the same directory, fsync, then a
//! rename over the target. The temp name embeds a fresh UUID, so an
//! attacker cannot pre-place a symlink at a predictable path; `create_new`
//! (O_CREAT | O_EXCL) additionally refuses to open through any pre-existing
//! entry. On any failure the original file is left byte-identical and the
//! temp artifact is removed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TrackerError;

fn temp_path_for(path: &Path) -> Result<PathBuf, TrackerError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TrackerError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid file name"),
        })?;
    let nonce = uuid::Uuid::new_v4().simple();
    Ok(dir.join(format!(".{}.{}.tmp", name, nonce)))
}

/// Replaces `path` with `content` atomically.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), TrackerError> {
    let temp_path = temp_path_for(path)?;

    let write_error = |source: std::io::Error| TrackerError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(write_error)?;

    let result = file
        .write_all(content)
        .and_then(|_| file.sync_all())
        .map_err(write_error)
        .and_then(|_| {
            drop(file);
            std::fs::rename(&temp_path, path).map_err(write_error)
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.md");

        write_atomic(&path, b"hello").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.md");
        std::fs::write(&path, b"old content").unwrap();

        write_atomic(&path, b"new content").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new content");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.md");

        write_atomic(&path, b"content").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "tracker.md");
    }

    #[test]
    fn test_write_atomic_failure_preserves_original() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("tracker.md");

        // Parent directory does not exist, so the temp create fails.
        let result = write_atomic(&path, b"content");
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_names_are_unpredictable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.md");
        let a = temp_path_for(&path).unwrap();
        let b = temp_path_for(&path).unwrap();
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_str().unwrap().starts_with(".tracker.md."));
    }

    #[cfg(unix)]
    #[test]
    fn test_does_not_follow_symlink_at_temp_path() {
        // A symlink pre-placed at the target path itself must not cause the
        // write to land elsewhere: the temp name is fresh, and the rename
        // replaces the symlink with a regular file.
        let dir = TempDir::new().unwrap();
        let victim = dir.path().join("victim.txt");
        std::fs::write(&victim, b"victim").unwrap();

        let path = dir.path().join("tracker.md");
        std::os::unix::fs::symlink(&victim, &path).unwrap();

        write_atomic(&path, b"content").unwrap();

        assert_eq!(std::fs::read(&victim).unwrap(), b"victim");
        assert_eq!(std::fs::read(&path).unwrap(), b"content");
        assert!(std::fs::symlink_metadata(&path).unwrap().file_type().is_file());
    }
}
