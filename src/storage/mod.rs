//! Persistent model for setting documents
//!
//! The registry writes through the narrow [`SettingsModel`] interface:
//! `insert` for first-time documents and `upsert` with a partial
//! [`SettingUpdate`] for everything else. Models keep documents as raw
//! JSON objects so that partial updates touch exactly the fields they name.
//!
//! Two models are provided:
//! - [`MemoryModel`] - in-memory, for tests and embedding
//! - [`JsonFileModel`] - the whole collection in a single file, rewritten
//!   atomically through a [`StorageBackend`]

mod file;
mod memory;

pub use file::JsonFileModel;
pub use memory::MemoryModel;

use crate::config::Document;
use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// Partial Updates
// =============================================================================

/// Fields to set and fields to remove on a stored document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingUpdate {
    pub set: Map<String, Value>,
    pub unset: Vec<String>,
}

impl SettingUpdate {
    /// Set every field of `document` except its id
    pub fn set_all(mut document: Map<String, Value>) -> Self {
        document.remove("_id");
        Self {
            set: document,
            unset: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Apply to a raw document: removals first, then assignments
    pub fn apply(&self, document: &mut Map<String, Value>) {
        for key in &self.unset {
            document.remove(key);
        }
        for (key, value) in &self.set {
            document.insert(key.clone(), value.clone());
        }
    }
}

// =============================================================================
// Model Trait
// =============================================================================

/// Durable collection of setting and group documents
pub trait SettingsModel: Send + Sync {
    /// Insert a new document
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDocument`] if the id is already stored, or a
    /// storage error if the write fails.
    fn insert(&self, document: &Document) -> Result<()>;

    /// Apply a partial update, creating the document if it does not exist
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    fn upsert(&self, id: &str, update: &SettingUpdate) -> Result<()>;

    /// Read one document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the stored document cannot be decoded.
    fn find_one(&self, id: &str) -> Result<Option<Document>>;

    /// Read every document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a stored document cannot be decoded.
    fn find(&self) -> Result<Vec<Document>>;
}

/// Raw documents keyed by id
pub(crate) type Collection = BTreeMap<String, Map<String, Value>>;

pub(crate) fn insert_into(collection: &mut Collection, document: &Document) -> Result<()> {
    let id = document.id();
    if collection.contains_key(id) {
        return Err(Error::DuplicateDocument(id.to_string()));
    }
    collection.insert(id.to_string(), document.to_map()?);
    Ok(())
}

pub(crate) fn upsert_into(collection: &mut Collection, id: &str, update: &SettingUpdate) {
    let document = collection.entry(id.to_string()).or_insert_with(|| {
        let mut fresh = Map::new();
        fresh.insert("_id".to_string(), Value::String(id.to_string()));
        fresh
    });
    update.apply(document);
}

pub(crate) fn decode_all(collection: &Collection) -> Result<Vec<Document>> {
    collection
        .values()
        .map(|raw| Document::from_map(raw.clone()))
        .collect()
}

// =============================================================================
// Storage Backend
// =============================================================================

/// Serialization format used by file-backed models
pub trait StorageBackend: Clone + Send + Sync {
    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.deserialize(&content)
    }

    /// Replace the file at `path` with `data`
    ///
    /// File models hold the whole collection in one file. The content goes to a
    /// sibling `.tmp` file first and is renamed over `path`, so the file always
    /// holds either the previous collection or the new one in full. Missing
    /// parent directories are created.
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// JSON storage backend (default)
#[derive(Clone, Default)]
pub struct JsonStorage {
    pretty: bool,
}

impl JsonStorage {
    /// JSON with pretty printing
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// JSON without pretty printing
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl StorageBackend for JsonStorage {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
