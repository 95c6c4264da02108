// src/services/blob_storage.rs
// DOCUMENTATION: Local filesystem storage for uploaded media
// PURPOSE: store(file) -> public path, delete(path) -> bool

use crate::errors::PlacesError;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Filesystem-backed blob store
/// DOCUMENTATION: Files live under `root`; callers only ever see public paths
/// of the form `{public_prefix}/{folder}/{file}`
#[derive(Debug, Clone)]
pub struct BlobStorage {
    root: PathBuf,
    public_prefix: String,
}

impl BlobStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Write bytes under a fresh name inside `folder`, keeping the original extension
    pub async fn store(
        &self,
        folder: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, PlacesError> {
        let folder = folder.trim_matches('/');
        if !is_plain_relative(Path::new(folder)) {
            return Err(PlacesError::InvalidInput(format!("Invalid folder '{}'", folder)));
        }

        let file_name = match extension_of(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            log::error!("Failed to create storage dir {}: {}", dir.display(), e);
            PlacesError::StorageFailure(format!("could not prepare {}", folder))
        })?;

        let target = dir.join(&file_name);
        tokio::fs::write(&target, bytes).await.map_err(|e| {
            log::error!("Failed to write {}: {}", target.display(), e);
            PlacesError::StorageFailure(format!("could not write {}", file_name))
        })?;

        let public_path = format!("{}/{}/{}", self.public_prefix, folder, file_name);
        log::info!("Stored {} bytes at {}", bytes.len(), public_path);
        Ok(public_path)
    }

    /// Remove a stored file. Returns false (and logs) when it could not be removed.
    pub async fn delete(&self, public_path: &str) -> bool {
        let Some(target) = self.resolve(public_path) else {
            log::warn!("Refusing to delete path outside storage: {}", public_path);
            return false;
        };

        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                log::info!("Deleted stored file {}", public_path);
                true
            }
            Err(e) => {
                log::warn!("Failed to delete stored file {}: {}", public_path, e);
                false
            }
        }
    }

    /// Delete every path, returning the ones that failed
    pub async fn delete_all<I, S>(&self, paths: I) -> (usize, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut deleted = 0;
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if self.delete(path).await {
                deleted += 1;
            } else {
                failures.push(path.to_string());
            }
        }
        (deleted, failures)
    }

    /// Map a public path back to a file under root
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path
            .strip_prefix(&self.public_prefix)
            .unwrap_or(public_path)
            .trim_start_matches('/');

        let relative = Path::new(relative);
        if relative.as_os_str().is_empty() || !is_plain_relative(relative) {
            return None;
        }
        Some(self.root.join(relative))
    }
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (BlobStorage, PathBuf) {
        let root = std::env::temp_dir().join(format!("blob-test-{}", Uuid::new_v4()));
        (BlobStorage::new(root.clone(), "/storage/"), root)
    }

    #[tokio::test]
    async fn test_store_then_delete() {
        let (storage, root) = temp_storage();

        let path = storage.store("places", "Sunset.JPG", b"jpeg-bytes").await.unwrap();
        assert!(path.starts_with("/storage/places/"));
        assert!(path.ends_with(".jpg"));

        let on_disk = root.join(path.trim_start_matches("/storage/"));
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"jpeg-bytes");

        assert!(storage.delete(&path).await);
        assert!(!on_disk.exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_delete_missing_file_reports_false() {
        let (storage, _) = temp_storage();
        assert!(!storage.delete("/storage/places/missing.jpg").await);
    }

    #[tokio::test]
    async fn test_delete_refuses_traversal() {
        let (storage, _) = temp_storage();
        assert!(!storage.delete("/storage/../etc/passwd").await);
        assert!(!storage.delete("/storage/").await);
    }

    #[tokio::test]
    async fn test_store_rejects_bad_folder() {
        let (storage, _) = temp_storage();
        let result = storage.store("../outside", "a.png", b"x").await;
        assert!(matches!(result, Err(PlacesError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_all_collects_failures() {
        let (storage, root) = temp_storage();
        let kept = storage.store("images", "a.png", b"1").await.unwrap();

        let (deleted, failures) = storage
            .delete_all([kept.as_str(), "/storage/images/gone.png"])
            .await;

        assert_eq!(deleted, 1);
        assert_eq!(failures, vec!["/storage/images/gone.png".to_string()]);
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPEG"), Some("jpeg".to_string()));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of("weird.p$g"), None);
    }
}
