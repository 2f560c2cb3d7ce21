//! Photo blob storage.
//!
//! Photos are written under a single directory. Names are chosen by the
//! caller; a later save with the same name overwrites the earlier blob.

use crate::error::WatchResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage for attached photos.
pub trait FileStore {
    /// Store `bytes` and return the path the blob can be read back from.
    fn save(&self, bytes: &[u8], suggested_name: &str) -> WatchResult<PathBuf>;

    /// Whether a blob exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read a stored blob.
    fn read(&self, path: &Path) -> WatchResult<Vec<u8>>;
}

/// File store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for DiskFileStore {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> WatchResult<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.root.join(sanitize_file_name(suggested_name));
        fs::write(&path, bytes)?;

        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> WatchResult<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}

/// Keep only the final path component so a name cannot escape the root.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        "photo".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_read_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskFileStore::new(temp_dir.path().join("uploaded_images"));

        let path = store.save(b"\x89PNG", "20240101_101500_pond.png").unwrap();
        assert!(path.starts_with(store.root()));
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), b"\x89PNG");
        assert!(!store.exists(&store.root().join("missing.png")));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\tap.jpg"), "tap.jpg");
        assert_eq!(sanitize_file_name(".."), "photo");
        assert_eq!(sanitize_file_name("tap.jpg"), "tap.jpg");
    }
}
