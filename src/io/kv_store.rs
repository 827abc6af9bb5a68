use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::io::atomic::atomic_write;

/// Key holding the todo collection
pub const TODOS_KEY: &str = "todos";
/// Key holding the last-used grouping and filter
pub const VIEW_KEY: &str = "view";

/// Error type for key-value persistence
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("stored value for '{key}' is malformed: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("state file {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed blob store the todo store persists through.
///
/// `load` returns the type's default when the key was never written.
pub trait KeyValueStore {
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, PersistError>;
    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), PersistError>;
}

/// All keys in one pretty-printed JSON object file, rewritten atomically on
/// every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(PersistError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(PersistError::NotAnObject {
                path: self.path.clone(),
            }),
            Err(source) => Err(PersistError::Decode {
                key: "*".to_string(),
                source,
            }),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, PersistError> {
        let mut object = self.read_object()?;
        match object.remove(key) {
            Some(value) => serde_json::from_value(value).map_err(|source| PersistError::Decode {
                key: key.to_string(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), PersistError> {
        let mut object = self.read_object()?;
        object.insert(key.to_string(), serde_json::to_value(value)?);
        let content = serde_json::to_string_pretty(&Value::Object(object))?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| PersistError::WriteError {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| PersistError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// In-memory store, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, PersistError> {
        match self.values.get(key) {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|source| PersistError::Decode {
                    key: key.to_string(),
                    source,
                })
            }
            None => Ok(T::default()),
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::view::{GroupLevel, GroupingConfig, ViewState};
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let todos: Vec<crate::model::todo::Todo> = store.load(TODOS_KEY).unwrap();
        assert!(todos.is_empty());
        let view: ViewState = store.load(VIEW_KEY).unwrap();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn keys_are_saved_independently() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.json");
        let mut store = JsonFileStore::new(&path);

        let view = ViewState {
            grouping: GroupingConfig::single(GroupLevel::Project),
            ..Default::default()
        };
        store.save(VIEW_KEY, &view).unwrap();
        store.save(TODOS_KEY, &Vec::<crate::model::todo::Todo>::new()).unwrap();

        let reopened = JsonFileStore::new(&path);
        let loaded: ViewState = reopened.load(VIEW_KEY).unwrap();
        assert_eq!(loaded, view);
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get(TODOS_KEY).unwrap().is_array());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json {{{").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load::<ViewState>(VIEW_KEY).is_err());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            store.load::<ViewState>(VIEW_KEY),
            Err(PersistError::NotAnObject { .. })
        ));
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load::<Vec<String>>("k").unwrap(), Vec::<String>::new());
        store.save("k", &vec!["a".to_string()]).unwrap();
        assert_eq!(store.load::<Vec<String>>("k").unwrap(), vec!["a"]);
        assert_eq!(store.saves, 1);
    }
}
