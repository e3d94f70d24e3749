//! JSON file preference store for native hosts.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::PreferenceStore;
use crate::error::StoreError;

/// A [`PreferenceStore`] persisted as a flat JSON object on disk.
///
/// The file is read on every `get` and rewritten on every `set`, so several
/// processes pointing at the same file see each other's choices. A missing
/// file reads as empty; a file that is not a string-to-string object is
/// reported as [`StoreError::Corrupt`].
///
/// ```json
/// { "selectedStylesheet": "style2" }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let values = merged(self.read_all(), key, value)?;

        let io_err = |e: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&values).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

/// Adds `key` to what was read. A corrupt file is replaced rather than
/// blocking every future write; any other read error aborts the write.
fn merged(
    existing: Result<BTreeMap<String, String>, StoreError>,
    key: &str,
    value: &str,
) -> Result<BTreeMap<String, String>, StoreError> {
    let mut values = match existing {
        Ok(values) => values,
        Err(StoreError::Corrupt { .. }) => BTreeMap::new(),
        Err(e) => return Err(e),
    };
    values.insert(key.to_string(), value.to_string());
    Ok(values)
}
