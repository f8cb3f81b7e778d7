use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Where uploaded artwork images and artist avatars live.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores `data` under `folder` with a fresh name and returns the stored path.
    async fn upload_to_folder(&self, folder: &str, extension: &str, data: &[u8]) -> Result<String, StorageError>;
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
    async fn delete_folder(&self, folder: &str) -> Result<(), StorageError>;
    fn public_url(&self, path: &str) -> String;
}
