//! Browser `localStorage` backend for WASM.

use super::{KeyValueStore, StorageError, StorageResult};

/// Stores boards in `window.localStorage` under a key prefix.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    prefix: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new("boardink:")
    }
}

impl LocalStorageStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage(&self) -> StorageResult<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage unavailable: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage unavailable".to_string()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl KeyValueStore for LocalStorageStore {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage()?
            .set_item(&self.full_key(key), value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)))
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        self.storage()?
            .get_item(&self.full_key(key))
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.storage()?
            .remove_item(&self.full_key(key))
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)))
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let storage = self.storage()?;
        let len = storage
            .length()
            .map_err(|e| StorageError::Io(format!("Failed to list keys: {:?}", e)))?;
        let mut keys = Vec::new();
        for i in 0..len {
            if let Ok(Some(key)) = storage.key(i) {
                if let Some(stripped) = key.strip_prefix(&self.prefix) {
                    keys.push(stripped.to_string());
                }
            }
        }
        Ok(keys)
    }
}
