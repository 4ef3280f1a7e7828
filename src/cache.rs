//! Cached settings store
//!
//! Process-wide read path for current setting values. The registry only uses
//! point lookups, an existence check and `set` for first-time inserts; keeping
//! the cache in sync with later writes is the job of whoever owns it.

use crate::config::{Document, Setting};
use crate::error::Result;
use crate::storage::SettingsModel;
use crate::sync::RwLockExt;
use log::debug;
use std::collections::HashMap;
use std::sync::RwLock;

/// Read path for current setting and group documents
pub trait SettingsCache: Send + Sync {
    /// Whether a document (setting or group) with this id is cached
    fn has(&self, id: &str) -> Result<bool>;

    /// Current setting document, if any. Groups are not returned.
    fn get_setting(&self, id: &str) -> Result<Option<Setting>>;

    /// Insert or replace a document
    fn set(&self, document: Document) -> Result<()>;
}

/// In-memory cache backed by a `RwLock<HashMap>`
pub struct MemoryCache {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Warm a cache from every document of a persistent model
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be read.
    pub fn load(model: &dyn SettingsModel) -> Result<Self> {
        let documents: HashMap<String, Document> = model
            .find()?
            .into_iter()
            .map(|document| (document.id().to_string(), document))
            .collect();
        debug!("Settings cache loaded with {} documents", documents.len());
        Ok(Self {
            documents: RwLock::new(documents),
        })
    }

    /// Cached document of any kind
    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.read_recovered().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.read_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read_recovered().is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsCache for MemoryCache {
    fn has(&self, id: &str) -> Result<bool> {
        Ok(self.documents.read_recovered().contains_key(id))
    }

    fn get_setting(&self, id: &str) -> Result<Option<Setting>> {
        Ok(self
            .documents
            .read_recovered()
            .get(id)
            .and_then(Document::as_setting)
            .cloned())
    }

    fn set(&self, document: Document) -> Result<()> {
        self.documents
            .write_recovered()
            .insert(document.id().to_string(), document);
        Ok(())
    }
}
