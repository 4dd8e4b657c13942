//! Naming and persistence of per-request artifacts.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::SourceFormat;

/// Owns the temp directory shared by all requests.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`. Call [`ensure_dir`](Self::ensure_dir)
    /// before first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the temp directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the temp directory if needed.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Path of the uploaded input for `request_id`.
    pub fn input_path(&self, request_id: &str, format: SourceFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", request_id, format.extension()))
    }

    /// Path of the PDF produced for `request_id`.
    pub fn output_path(&self, request_id: &str) -> PathBuf {
        self.root.join(format!("{}.pdf", request_id))
    }

    /// A fresh, collision-free path for an intermediate document.
    pub fn intermediate_path(&self, format: SourceFormat) -> PathBuf {
        self.root
            .join(format!("{}.{}", Uuid::new_v4(), format.extension()))
    }

    /// Writes an upload to `path`. A partially written file is removed
    /// before the error is returned.
    pub async fn persist_upload(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        match tokio::fs::write(path, bytes).await {
            Ok(()) => {
                debug!(path = %path.display(), size = bytes.len(), "Stored upload");
                Ok(())
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(path).await {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        warn!(
                            path = %path.display(),
                            "Failed to remove partial upload: {}", remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_scoped_names() {
        let store = ArtifactStore::new("/tmp/hwpdf");
        assert_eq!(
            store.input_path("abc", SourceFormat::Hwp),
            PathBuf::from("/tmp/hwpdf/abc.hwp")
        );
        assert_eq!(
            store.input_path("abc", SourceFormat::Hwpx),
            PathBuf::from("/tmp/hwpdf/abc.hwpx")
        );
        assert_eq!(store.output_path("abc"), PathBuf::from("/tmp/hwpdf/abc.pdf"));
    }

    #[test]
    fn test_intermediate_paths_are_unique() {
        let store = ArtifactStore::new("/tmp/hwpdf");
        let a = store.intermediate_path(SourceFormat::Hwpx);
        let b = store.intermediate_path(SourceFormat::Hwpx);
        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "hwpx");
        assert!(a.starts_with("/tmp/hwpdf"));
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("a/b"));
        store.ensure_dir().await.unwrap();
        assert!(store.root().is_dir());
        // Idempotent.
        store.ensure_dir().await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_upload_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.input_path("req", SourceFormat::Hwp);

        store.persist_upload(&path, b"HWP Document File").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"HWP Document File");
    }

    #[tokio::test]
    async fn test_persist_upload_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("missing"));
        let path = store.input_path("req", SourceFormat::Hwp);

        assert!(store.persist_upload(&path, b"data").await.is_err());
        assert!(!path.exists());
    }
}
