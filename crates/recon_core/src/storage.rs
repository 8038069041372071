use std::collections::HashMap;
use std::io::{Error, ErrorKind, Result};
use std::sync::{Arc, RwLock};

/// Abstraction over the durable key-value store holding editor state.
///
/// The browser build keeps state in `localStorage`; native builds use a
/// directory of JSON files. Values are whole serialized collections, written
/// wholesale on every save.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// Write several values as one unit.
    ///
    /// Implementations should make the write as close to all-or-nothing as
    /// the backing medium allows. The default writes them in order.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

// Blanket implementation for references to KeyValueStore
impl<T: KeyValueStore> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (*self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (*self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (*self).remove(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        (*self).set_many(entries)
    }
}

// ============================================================================
// InMemoryStore - Available on all targets, including WASM
// ============================================================================

/// An in-memory key-value store.
/// Clones share the same entries, so a host can keep a handle and export
/// entries to its own storage (e.g. `localStorage`) after each save.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries(entries: Vec<(String, String)>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries.into_iter().collect())),
        }
    }

    /// Export all entries as (key, value) tuples
    pub fn export_entries(&self) -> Vec<(String, String)> {
        match self.entries.read() {
            Ok(entries) => entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> Error {
    Error::other("In-memory store lock poisoned")
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, values: &[(&str, &str)]) -> Result<()> {
        // One lock for the whole batch
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        for (key, value) in values {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

// ============================================================================
// DirectoryStore - Only available on non-WASM targets
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use native::DirectoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::{Error, ErrorKind, Result};
    use std::path::{Path, PathBuf};

    use super::{KeyValueStore, validate_key};

    /// Stores each key as `<root>/<key>.json`.
    ///
    /// Writes go to a `.tmp` sibling first and are renamed into place, so a
    /// single key is never left half-written. `set_many` stages every value
    /// before renaming any, which keeps the window in which only some keys are
    /// updated down to the renames.
    #[derive(Debug, Clone)]
    pub struct DirectoryStore {
        root: PathBuf,
    }

    impl DirectoryStore {
        /// Open (and create if needed) a store rooted at `root`.
        pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
            let root = root.into();
            fs::create_dir_all(&root)?;
            Ok(Self { root })
        }

        /// The directory holding the values.
        pub fn root(&self) -> &Path {
            &self.root
        }

        fn value_path(&self, key: &str) -> Result<PathBuf> {
            validate_key(key)?;
            Ok(self.root.join(format!("{key}.json")))
        }

        fn staging_path(&self, key: &str) -> Result<PathBuf> {
            validate_key(key)?;
            Ok(self.root.join(format!("{key}.json.tmp")))
        }
    }

    impl KeyValueStore for DirectoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            match fs::read_to_string(self.value_path(key)?) {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.set_many(&[(key, value)])
        }

        fn remove(&self, key: &str) -> Result<()> {
            match fs::remove_file(self.value_path(key)?) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        }

        fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
            let mut staged = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let tmp = self.staging_path(key)?;
                if let Err(e) = fs::write(&tmp, value) {
                    for (tmp, _) in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    return Err(e);
                }
                staged.push((tmp, self.value_path(key)?));
            }

            for (tmp, target) in staged {
                fs::rename(&tmp, &target).map_err(|e| {
                    Error::new(e.kind(), format!("Failed to commit {:?}: {}", target, e))
                })?;
            }
            Ok(())
        }
    }
}

/// Keys become file names, so keep them to a safe character set.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid storage key: {:?}", key),
        ))
    }
}
