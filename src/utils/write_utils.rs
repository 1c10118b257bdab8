//! Artifact writing utilities
//!
//! Artifacts are written to a hidden sibling file and renamed into place,
//! so a failed write never leaves a partial file under the final name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{OverlayError, OverlayResult};

/// Temporary sibling path used while `path` is being written
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Run `write` against a temporary path, then rename it to `path`
///
/// The temporary file is removed when `write` or the rename fails.
pub fn write_atomic_with<F>(path: &Path, write: F) -> OverlayResult<()>
where
    F: FnOnce(&Path) -> OverlayResult<()>,
{
    let temp_path = temp_path_for(path);

    let result = write(&temp_path).and_then(|_| {
        fs::rename(&temp_path, path)
            .map_err(|e| OverlayError::io(format!("moving artifact into {}", path.display()), e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Write `contents` to `path` atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> OverlayResult<()> {
    write_atomic_with(path, |temp_path| {
        fs::write(temp_path, contents)
            .map_err(|e| OverlayError::io(format!("writing {}", path.display()), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_hidden_sibling() {
        assert_eq!(temp_path_for(Path::new("/out/scene.png")), PathBuf::from("/out/.scene.png.tmp"));
    }

    #[test]
    fn writes_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("meta.json");
        write_atomic(&target, b"{}").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"{}");
        assert!(!temp_path_for(&target).exists());
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("scene.png");
        let result = write_atomic_with(&target, |temp| {
            fs::write(temp, b"partial").unwrap();
            Err(OverlayError::Normalization("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(!target.exists());
        assert!(!temp_path_for(&target).exists());
    }
}
