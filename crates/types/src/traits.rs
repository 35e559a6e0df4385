//! Async traits and aliases shared across all wayfare crates.
//!
//! Every cross-crate abstraction is defined here so that higher layers depend
//! only on `wayfare-types`, not on each other.

use crate::ApiError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ApiError>;

/// A pinned, sendable stream of raw response byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Keys under which session credentials are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    UserId,
    UserEmail,
}

impl CredentialKey {
    /// All keys a forced logout must clear.
    pub const ALL: [Self; 4] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::UserId,
        Self::UserEmail,
    ];

    /// Stable storage name for this key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::UserId => "user_id",
            Self::UserEmail => "user_email",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque key-value storage for session credentials.
///
/// The gateway holds no persistent copy of the credential triplet; every
/// request and refresh cycle reads through this trait. Implementations must
/// serialize multi-field writes so the triplet is never observably
/// half-written.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load a single credential, if present.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Persist (or overwrite) a single credential.
    async fn set(&self, key: CredentialKey, value: &str) -> Result<()>;

    /// Remove the given credentials. Missing keys are not an error.
    async fn clear(&self, keys: &[CredentialKey]) -> Result<()>;

    /// Batch read. Keys with no stored value are absent from the result.
    async fn get_many(&self, keys: &[CredentialKey]) -> Result<HashMap<CredentialKey, String>> {
        let mut out = HashMap::new();
        for &key in keys {
            if let Some(value) = self.get(key).await? {
                out.insert(key, value);
            }
        }
        Ok(out)
    }

    /// Batch write. Implementations backing shared storage should override
    /// this so the whole batch lands atomically.
    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(*key, value).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Minimal store relying on the default batch implementations.
    struct MapStore {
        data: Mutex<HashMap<CredentialKey, String>>,
    }

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
            Ok(self.data.lock().unwrap().get(&key).cloned())
        }

        async fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
            self.data.lock().unwrap().insert(key, value.to_string());
            Ok(())
        }

        async fn clear(&self, keys: &[CredentialKey]) -> Result<()> {
            let mut data = self.data.lock().unwrap();
            for key in keys {
                data.remove(key);
            }
            Ok(())
        }
    }

    fn make_store() -> MapStore {
        MapStore {
            data: Mutex::new(HashMap::new()),
        }
    }

    #[test]
    fn test_key_names_stable() {
        assert_eq!(CredentialKey::AccessToken.as_str(), "access_token");
        assert_eq!(CredentialKey::RefreshToken.as_str(), "refresh_token");
        assert_eq!(CredentialKey::UserId.as_str(), "user_id");
        assert_eq!(CredentialKey::UserEmail.as_str(), "user_email");
    }

    #[test]
    fn test_all_covers_every_key() {
        assert_eq!(CredentialKey::ALL.len(), 4);
    }

    #[tokio::test]
    async fn test_default_get_many_skips_missing() {
        let store = make_store();
        store.set(CredentialKey::AccessToken, "at").await.unwrap();
        let map = store
            .get_many(&[CredentialKey::AccessToken, CredentialKey::UserId])
            .await
            .unwrap();
        assert_eq!(map.get(&CredentialKey::AccessToken).unwrap(), "at");
        assert!(!map.contains_key(&CredentialKey::UserId));
    }

    #[tokio::test]
    async fn test_default_set_many_writes_all() {
        let store = make_store();
        store
            .set_many(&[
                (CredentialKey::AccessToken, "at".to_string()),
                (CredentialKey::RefreshToken, "rt".to_string()),
            ])
            .await
            .unwrap();
        assert_eq!(
            store.get(CredentialKey::AccessToken).await.unwrap(),
            Some("at".to_string())
        );
        assert_eq!(
            store.get(CredentialKey::RefreshToken).await.unwrap(),
            Some("rt".to_string())
        );
    }
}
