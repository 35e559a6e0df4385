//! JSON-file-backed credential store.
//!
//! Persists credentials as a flat JSON object (key name → value) at a
//! caller-chosen path, e.g. `~/.wayfare/credentials.json`. Every operation
//! holds an async mutex across its read-modify-write cycle, so batch writes
//! land in one file write and the triplet is never half-persisted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use wayfare_types::{ApiError, CredentialKey, CredentialStore, traits::Result};

/// A [`CredentialStore`] that persists to a JSON file on disk.
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store backed by the given file path. The file (and its
    /// parent directory) are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Storage(format!("corrupt credential file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key.as_str()))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.as_str().to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn clear(&self, keys: &[CredentialKey]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        for key in keys {
            map.remove(key.as_str());
        }
        self.write_map(&map).await
    }

    async fn get_many(&self, keys: &[CredentialKey]) -> Result<HashMap<CredentialKey, String>> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        Ok(keys
            .iter()
            .filter_map(|key| map.get(key.as_str()).map(|v| (*key, v.clone())))
            .collect())
    }

    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        for (key, value) in entries {
            map.insert(key.as_str().to_string(), value.clone());
        }
        self.write_map(&map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileCredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_get_before_first_write() {
        let (_dir, store) = temp_store();
        assert!(
            store
                .get(CredentialKey::AccessToken)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let (_dir, store) = temp_store();
        store.set(CredentialKey::AccessToken, "at").await.unwrap();
        assert_eq!(
            store.get(CredentialKey::AccessToken).await.unwrap(),
            Some("at".to_string())
        );
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let (_dir, store) = temp_store();
        store
            .set_many(&[
                (CredentialKey::AccessToken, "at".to_string()),
                (CredentialKey::RefreshToken, "rt".to_string()),
            ])
            .await
            .unwrap();

        let reopened = FileCredentialStore::new(store.path().to_path_buf());
        assert_eq!(
            reopened.get(CredentialKey::RefreshToken).await.unwrap(),
            Some("rt".to_string())
        );
    }

    #[tokio::test]
    async fn test_clear_subset() {
        let (_dir, store) = temp_store();
        store
            .set_many(&[
                (CredentialKey::AccessToken, "at".to_string()),
                (CredentialKey::UserEmail, "a@b.c".to_string()),
            ])
            .await
            .unwrap();
        store.clear(&[CredentialKey::AccessToken]).await.unwrap();
        assert!(
            store
                .get(CredentialKey::AccessToken)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            store.get(CredentialKey::UserEmail).await.unwrap(),
            Some("a@b.c".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let (_dir, store) = temp_store();
        tokio::fs::write(store.path(), b"not json").await.unwrap();
        let err = store.get(CredentialKey::AccessToken).await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[tokio::test]
    async fn test_file_is_flat_string_map() {
        let (_dir, store) = temp_store();
        store.set(CredentialKey::UserId, "42").await.unwrap();
        let raw = tokio::fs::read_to_string(store.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["user_id"], "42");
    }
}
