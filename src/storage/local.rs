use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::{StorageBackend, StorageError};

pub struct LocalStorage {
    upload_dir: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(upload_dir: &str, base_url: &str) -> Self {
        Self {
            upload_dir: PathBuf::from(upload_dir),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Maps an `/uploads/...` path back into the upload directory, refusing `..` escapes.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches("/uploads/").trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.upload_dir.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn upload_to_folder(&self, folder: &str, extension: &str, data: &[u8]) -> Result<String, StorageError> {
        let dir = self.resolve(folder)?;
        fs::create_dir_all(&dir).await?;

        let unique_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(dir.join(&unique_name), data).await?;

        Ok(format!("/uploads/{}/{}", folder, unique_name))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let file_path = self.resolve(path)?;
        if fs::try_exists(&file_path).await? {
            fs::remove_file(&file_path).await?;
        }
        Ok(())
    }

    async fn delete_folder(&self, folder: &str) -> Result<(), StorageError> {
        let dir = self.resolve(folder)?;
        if fs::try_exists(&dir).await? {
            fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_delete_folder() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap(), "http://localhost:3000/");

        let path = storage.upload_to_folder("artworks/abc", "jpg", b"bytes").await.unwrap();
        assert!(path.starts_with("/uploads/artworks/abc/"));
        assert!(path.ends_with(".jpg"));
        assert_eq!(
            storage.public_url(&path),
            format!("http://localhost:3000{}", path)
        );

        let on_disk = storage.resolve(&path).unwrap();
        assert_eq!(fs::read(&on_disk).await.unwrap(), b"bytes");

        storage.delete_folder("artworks/abc").await.unwrap();
        assert!(!on_disk.exists());
    }

    #[test]
    fn parent_components_are_refused() {
        let storage = LocalStorage::new("/tmp/uploads", "http://localhost:3000");
        assert!(storage.resolve("/uploads/../etc/passwd").is_err());
        assert!(storage.resolve("artworks/../../x").is_err());
    }
}
