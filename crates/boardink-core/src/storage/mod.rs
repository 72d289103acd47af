//! Key-value storage backends for board persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String values keyed by board id.
///
/// Implementations can store entries in memory, on disk, or in the
/// browser's `localStorage`.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Write a value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a value; `NotFound` if the key was never written.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete a value. Missing keys are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.load(key) {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// String values keyed by board id (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    /// Write a value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a value; `NotFound` if the key was never written.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Delete a value. Missing keys are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.load(key) {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
