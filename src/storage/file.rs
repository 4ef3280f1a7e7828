//! File-backed settings model
//!
//! Keeps the collection in memory and rewrites the whole file on every write.
//! The in-memory copy only changes once the file write has succeeded.

use super::{
    Collection, JsonStorage, SettingUpdate, SettingsModel, StorageBackend, decode_all,
    insert_into, upsert_into,
};
use crate::config::Document;
use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Settings collection persisted as an array of documents in one file
pub struct JsonFileModel<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    storage: S,
    documents: RwLock<Collection>,
}

impl JsonFileModel<JsonStorage> {
    /// Open (or start) a collection at `path` using pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_storage(path, JsonStorage::new())
    }
}

impl<S: StorageBackend> JsonFileModel<S> {
    /// Open a collection with a custom storage backend
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn with_storage(path: impl Into<PathBuf>, storage: S) -> Result<Self> {
        let path = path.into();
        let mut documents = Collection::new();

        if path.exists() {
            let raw: Vec<Map<String, Value>> = storage.read(&path)?;
            for document in raw {
                let id = document
                    .get("_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        Error::Parse(format!("document without _id in '{}'", path.display()))
                    })?
                    .to_string();
                documents.insert(id, document);
            }
            info!(
                "Loaded {} setting documents from {}",
                documents.len(),
                path.display()
            );
        }

        Ok(Self {
            path,
            storage,
            documents: RwLock::new(documents),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the collection, persist it, then publish it
    fn write_with<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Collection) -> Result<()>,
    {
        let mut guard = self.documents.write_recovered();
        let mut next = guard.clone();
        change(&mut next)?;

        let raw: Vec<&Map<String, Value>> = next.values().collect();
        self.storage.write(&self.path, &raw)?;
        debug!("Persisted {} setting documents", raw.len());

        *guard = next;
        Ok(())
    }
}

impl<S: StorageBackend> SettingsModel for JsonFileModel<S> {
    fn insert(&self, document: &Document) -> Result<()> {
        self.write_with(|collection| insert_into(collection, document))
    }

    fn upsert(&self, id: &str, update: &SettingUpdate) -> Result<()> {
        self.write_with(|collection| {
            upsert_into(collection, id, update);
            Ok(())
        })
    }

    fn find_one(&self, id: &str) -> Result<Option<Document>> {
        self.documents
            .read_recovered()
            .get(id)
            .map(|raw| Document::from_map(raw.clone()))
            .transpose()
    }

    fn find(&self) -> Result<Vec<Document>> {
        decode_all(&self.documents.read_recovered())
    }
}

// =============================================================================
// Tests
// =============================================================================
