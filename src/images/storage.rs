//! Filesystem-level storage for uploaded images.
//!
//! Files live flat in one directory under generated names
//! (`<uuid-v4><ext>`) and are addressed from the outside by their public
//! path (`/uploads/<name>`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use vitae_common::paths::{public_path, stored_file_name, upload_extension};

/// A file written by [`UploadStorage::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated file name inside the upload directory.
    pub name: String,
    /// Server-relative URL path (`/uploads/<name>`).
    pub public_path: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Filesystem manager for the upload directory.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    /// Create storage rooted at `dir`, creating the directory (and parents)
    /// if it does not exist.
    pub fn init(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// The upload directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a fresh file name keeping the original extension.
    pub fn generate_name(original_name: &str) -> String {
        let ext = upload_extension(original_name).unwrap_or_default();
        format!("{}{}", uuid::Uuid::new_v4(), ext)
    }

    /// Write `data` under a newly generated name.
    ///
    /// The file is created exclusively; an existing file is never
    /// overwritten.
    pub async fn write(&self, original_name: &str, data: &[u8]) -> std::io::Result<StoredFile> {
        let name = Self::generate_name(original_name);
        let path = self.dir.join(&name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(StoredFile {
            public_path: public_path(&name),
            name,
            size: data.len() as u64,
        })
    }

    /// Map a public path to its location on disk.
    ///
    /// Returns `None` for anything that is not a plain file directly inside
    /// the upload directory.
    pub fn resolve(&self, public: &str) -> Option<PathBuf> {
        stored_file_name(public).map(|name| self.dir.join(name))
    }

    /// Delete the file behind a public path.
    ///
    /// Returns `Ok(false)` when the path is not an upload path or the file
    /// is already gone.
    pub async fn remove(&self, public: &str) -> std::io::Result<bool> {
        let Some(path) = self.resolve(public) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the file behind a public path in a detached task.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn remove_detached(&self, public: String) -> JoinHandle<()> {
        let storage = self.clone();
        tokio::spawn(async move {
            match storage.remove(&public).await {
                Ok(true) => tracing::debug!(path = %public, "Removed replaced image"),
                Ok(false) => tracing::debug!(path = %public, "Replaced image already absent"),
                Err(e) => {
                    tracing::warn!(path = %public, error = %e, "Failed to remove replaced image")
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/uploads");

        let storage = UploadStorage::init(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.dir(), nested.as_path());

        // Idempotent
        UploadStorage::init(&nested).unwrap();
    }

    #[test]
    fn test_generate_name() {
        let name = UploadStorage::generate_name("Diploma.PNG");
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);

        let bare = UploadStorage::generate_name("blob");
        assert_eq!(bare.len(), 36);
        assert!(uuid::Uuid::parse_str(&bare).is_ok());

        assert_ne!(
            UploadStorage::generate_name("a.png"),
            UploadStorage::generate_name("a.png")
        );
    }

    #[tokio::test]
    async fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::init(dir.path()).unwrap();

        let stored = storage.write("cert.jpg", b"\xFF\xD8\xFF").await.unwrap();
        assert_eq!(stored.size, 3);
        assert_eq!(stored.public_path, format!("/uploads/{}", stored.name));

        let path = storage.resolve(&stored.public_path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"\xFF\xD8\xFF");

        assert!(storage.remove(&stored.public_path).await.unwrap());
        assert!(!path.exists());

        // Second removal is a no-op
        assert!(!storage.remove(&stored.public_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_paths() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let storage = UploadStorage::init(&uploads).unwrap();

        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();

        assert!(!storage.remove("/uploads/../keep.txt").await.unwrap());
        assert!(!storage.remove("/etc/passwd").await.unwrap());
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_remove_detached() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::init(dir.path()).unwrap();
        let stored = storage.write("a.webp", b"RIFF").await.unwrap();
        let path = storage.resolve(&stored.public_path).unwrap();

        storage
            .remove_detached(stored.public_path.clone())
            .await
            .unwrap();
        assert!(!path.exists());

        // Missing file does not panic the task
        storage
            .remove_detached(stored.public_path)
            .await
            .unwrap();
    }
}
