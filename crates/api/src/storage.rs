//! Document file storage.
//!
//! Handlers only see [`DocumentStorage`]; the server wires in
//! [`LocalDiskStorage`] rooted at `DOCUMENT_STORAGE_DIR`. Keys are relative
//! paths of the form `{asset_id}/{uuid}.{ext}` and never contain `..`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use assetdesk_core::types::DbId;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("No stored file for key {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte storage for uploaded asset documents.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove the file. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each document as a file below `root`.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl DocumentStorage for LocalDiskStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(storage_key = key, size = bytes.len(), "Stored document");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(storage_key = key, "Document already absent from storage");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys must be relative and may only contain normal path segments.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let path = Path::new(key);
    let ok = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// A fresh storage key for a file uploaded against `asset_id`.
///
/// Only the extension of the client-supplied name is kept.
pub fn storage_key(asset_id: DbId, file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) => format!("{asset_id}/{}.{ext}", Uuid::new_v4()),
        None => format!("{asset_id}/{}", Uuid::new_v4()),
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn put_get_delete_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path());
        let key = storage_key(4, "invoice.PDF");

        storage.put(&key, b"%PDF-1.7").await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), b"%PDF-1.7");

        storage.delete(&key).await.unwrap();
        assert_matches!(storage.get(&key).await, Err(StorageError::NotFound(_)));
        // Second delete is a no-op.
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path());
        for key in ["../escape", "/etc/passwd", "", "1/../../x"] {
            assert_matches!(storage.put(key, b"x").await, Err(StorageError::InvalidKey(_)), "{key}");
        }
    }

    #[test]
    fn keys_keep_only_a_safe_extension() {
        let key = storage_key(12, "scan.final.JPG");
        assert!(key.starts_with("12/"));
        assert!(key.ends_with(".jpg"));

        let bare = storage_key(12, "README");
        assert!(!bare.contains('.'));

        let odd = storage_key(12, "x.p$f");
        assert!(!odd.contains('$'));
    }

    #[test]
    fn sha256_matches_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
