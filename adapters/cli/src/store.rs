//! High-score store persisted as a TOML table on disk.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use grinch_smasher_system_high_score::{KeyValueStore, StoreError};

/// Key-value store backed by a single TOML file.
///
/// A missing file reads as an empty store. Every write rewrites the file.
#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`, loading any values already persisted.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => {
                toml::from_str(&contents).map_err(|err| StoreError::Corrupt(err.to_string()))?
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(unavailable(&path, &err)),
        };
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut values = self.values.clone();
        let _ = values.insert(key.to_owned(), value);
        let contents =
            toml::to_string(&values).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        fs::write(&self.path, contents).map_err(|err| unavailable(&self.path, &err))?;
        self.values = values;
        Ok(())
    }
}

fn unavailable(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}
