//! The saved meme collection and the key-value store it lives in.
//!
//! The whole library is one ordered JSON array stored under [`LIBRARY_KEY`].
//! Stores are deliberately dumb: they move bytes for a key and nothing else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use mememaker_common::error::MemeError;

use crate::meme::Meme;

/// Key the meme list is stored under.
pub const LIBRARY_KEY: &str = "memes";

/// Minimal persistence interface.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Errors that can occur when reading or writing the library.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in '{key}': {source}")]
    ParseError {
        key: String,
        source: serde_json::Error,
    },

    #[error("Invalid store key: '{key}'")]
    InvalidKey { key: String },

    #[error("No meme matches '{query}'")]
    NotFound { query: String },

    #[error("'{query}' matches {matches} memes")]
    Ambiguous { query: String, matches: usize },
}

impl From<StoreError> for MemeError {
    fn from(err: StoreError) -> Self {
        MemeError::storage(err.to_string())
    }
}

/// A store keeping one `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::IoError { path, source: e }),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root).map_err(|e| StoreError::IoError {
            path: self.root.clone(),
            source: e,
        })?;

        // rename is atomic within one filesystem
        let tmp_path = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp_path, value).map_err(|e| StoreError::IoError {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|e| StoreError::IoError { path, source: e })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::IoError { path, source: e }),
        }
    }
}

/// An in-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Every saved meme, in the order they were first saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemeLibrary {
    memes: Vec<Meme>,
}

impl MemeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the library. A store without the key yields an empty library.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let Some(bytes) = store.get(LIBRARY_KEY)? else {
            return Ok(Self::new());
        };
        let memes: Vec<Meme> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::ParseError {
                key: LIBRARY_KEY.to_string(),
                source: e,
            })?;
        tracing::debug!(count = memes.len(), "Loaded meme library");
        Ok(Self { memes })
    }

    /// Write the whole library back under [`LIBRARY_KEY`].
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.memes).map_err(|e| StoreError::ParseError {
            key: LIBRARY_KEY.to_string(),
            source: e,
        })?;
        store.set(LIBRARY_KEY, &bytes)?;
        tracing::info!(count = self.memes.len(), bytes = bytes.len(), "Saved meme library");
        Ok(())
    }

    /// Replace the meme with the same id, or append a new one.
    pub fn upsert(&mut self, meme: Meme) {
        match self.memes.iter_mut().find(|m| m.id() == meme.id()) {
            Some(existing) => *existing = meme,
            None => self.memes.push(meme),
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Meme> {
        let index = self.memes.iter().position(|m| m.id() == id)?;
        Some(self.memes.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Meme> {
        self.memes.iter().find(|m| m.id() == id)
    }

    /// Find a meme by a full id or a unique prefix of its hyphenated form.
    pub fn find_by_prefix(&self, query: &str) -> Result<&Meme, StoreError> {
        let needle = query.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(StoreError::NotFound {
                query: query.to_string(),
            });
        }
        let matches: Vec<&Meme> = self
            .memes
            .iter()
            .filter(|m| m.id().to_string().starts_with(&needle))
            .collect();
        match matches.as_slice() {
            [meme] => Ok(*meme),
            [] => Err(StoreError::NotFound {
                query: query.to_string(),
            }),
            many => Err(StoreError::Ambiguous {
                query: query.to_string(),
                matches: many.len(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Meme> {
        self.memes.iter()
    }

    pub fn len(&self) -> usize {
        self.memes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_loads_empty_library() {
        let store = MemoryStore::new();
        let library = MemeLibrary::load(&store).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_id_and_keeps_order() {
        let mut library = MemeLibrary::new();
        let a = Meme::new("a");
        let b = Meme::new("b");
        library.upsert(a.clone());
        library.upsert(b.clone());

        let mut renamed = a.clone();
        renamed.set_title("a2");
        library.upsert(renamed);

        let titles: Vec<_> = library.iter().map(|m| m.title().to_string()).collect();
        assert_eq!(titles, vec!["a2", "b"]);
    }

    #[test]
    fn test_persist_and_reload_through_memory_store() {
        let mut store = MemoryStore::new();
        let mut library = MemeLibrary::new();
        library.upsert(Meme::new("first"));
        library.upsert(Meme::new("second"));
        library.persist(&mut store).unwrap();

        let reloaded = MemeLibrary::load(&store).unwrap();
        assert_eq!(reloaded, library);
    }

    #[test]
    fn test_corrupt_library_is_parse_error() {
        let mut store = MemoryStore::new();
        store.set(LIBRARY_KEY, b"{not a list").unwrap();
        let err = MemeLibrary::load(&store).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("library"));

        assert!(store.get("memes").unwrap().is_none());
        store.set("memes", b"[]").unwrap();
        assert_eq!(store.get("memes").unwrap().unwrap(), b"[]");
        assert!(dir.path().join("library").join("memes.json").exists());

        store.remove("memes").unwrap();
        assert!(store.get("memes").unwrap().is_none());
        store.remove("memes").unwrap();
    }

    #[test]
    fn test_json_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        let err = store.set("../escape", b"x").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }

    #[test]
    fn test_find_by_prefix() {
        let mut library = MemeLibrary::new();
        let meme = Meme::new("findable");
        let id = meme.id().to_string();
        library.upsert(meme);

        assert_eq!(library.find_by_prefix(&id[..8]).unwrap().title(), "findable");
        assert_eq!(
            library
                .find_by_prefix(&id.to_ascii_uppercase())
                .unwrap()
                .title(),
            "findable"
        );
        assert!(matches!(
            library.find_by_prefix("zzzz"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            library.find_by_prefix(""),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_returns_meme() {
        let mut library = MemeLibrary::new();
        let meme = Meme::new("gone");
        let id = meme.id();
        library.upsert(meme);

        assert_eq!(library.remove(id).unwrap().title(), "gone");
        assert!(library.remove(id).is_none());
        assert!(library.get(id).is_none());
    }
}
