//! In-memory credential store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use wayfare_types::{CredentialKey, CredentialStore, traits::Result};

/// An in-memory [`CredentialStore`] implementation for testing and ephemeral
/// sessions.
///
/// All batch operations run under a single lock acquisition, so the
/// credential triplet is never observable half-written.
pub struct InMemoryCredentialStore {
    data: Mutex<HashMap<CredentialKey, String>>,
}

impl InMemoryCredentialStore {
    /// Creates a new empty in-memory credential store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
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

    async fn get_many(&self, keys: &[CredentialKey]) -> Result<HashMap<CredentialKey, String>> {
        let data = self.data.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|v| (*key, v.clone())))
            .collect())
    }

    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        for (key, value) in entries {
            data.insert(*key, value.clone());
        }
        Ok(())
    }
}
