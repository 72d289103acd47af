//! File-based storage implementation for native platforms.

use super::{KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Stores each board as `<encoded-key>.json` in a directory. Keys are
/// encoded with [`encode_key`], so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Base directory for board files.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/boardink/boards/`
    /// On Windows: `%LOCALAPPDATA%\boardink\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("boardink").join("boards"))
    }

    /// Get the file path for a key.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_key(key)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        // Write aside and rename so a failed write never truncates the board.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    }

    fn load(&self, key: &str) -> StorageResult<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                let Some(stem) = path.file_stem().and_then(|n| n.to_str()) else {
                    continue;
                };
                match decode_key(stem) {
                    Some(key) => keys.push(key),
                    None => log::warn!("ignoring unrecognized board file {}", path.display()),
                }
            }
        }
        Ok(keys)
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entry_path(key).exists())
    }
}

/// File-name-safe, reversible key encoding.
///
/// ASCII letters, digits and `-` pass through; every other byte, `_`
/// included, becomes `_XX` (uppercase hex).
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{byte:02X}"));
        }
    }
    encoded
}

/// Inverse of [`encode_key`]; `None` for names it could not have produced.
pub fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                let hex = encoded.get(i + 1..i + 3)?;
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || b == b'-' => {
                decoded.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_save_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.save("board-1", r#"{"lines":[]}"#).unwrap();
        assert_eq!(store.load("board-1").unwrap(), r#"{"lines":[]}"#);
        assert!(dir.path().join("board-1.json").exists());
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(store.load("nonexistent"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_store_list_and_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.save("b1", "{}").unwrap();
        store.save("b2", "{}").unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"b1".to_string()));

        store.delete("b1").unwrap();
        assert!(!store.exists("b1").unwrap());
        assert!(store.exists("b2").unwrap());
    }

    #[test]
    fn test_file_store_encodes_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.save("../boards/evil:key", "{}").unwrap();
        assert_eq!(store.load("../boards/evil:key").unwrap(), "{}");
        assert!(dir.path().join("_2E_2E_2Fboards_2Fevil_3Akey.json").exists());
        assert_eq!(store.list().unwrap(), vec!["../boards/evil:key".to_string()]);
    }

    #[test]
    fn test_similar_keys_do_not_collide() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.save("team/a", r#"{"lines":[1]}"#).unwrap();
        store.save("team_a", "{}").unwrap();
        store.save("team a", "[]").unwrap();
        assert_eq!(store.load("team/a").unwrap(), r#"{"lines":[1]}"#);
        assert_eq!(store.load("team_a").unwrap(), "{}");
        assert_eq!(store.load("team a").unwrap(), "[]");
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn test_key_encoding_round_trips() {
        for key in ["b1", "team_a", "ünï/côde", "_41", ""] {
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
        assert_eq!(decode_key("bad_Z1"), None);
        assert_eq!(decode_key("dot.json"), None);
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.save("b1", "first").unwrap();
        store.save("b1", "second").unwrap();
        assert_eq!(store.load("b1").unwrap(), "second");
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(nested.clone()).unwrap();
        assert_eq!(store.base_path(), nested.as_path());
        assert!(nested.is_dir());
    }
}
