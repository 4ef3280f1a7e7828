//! In-memory settings model

use super::{Collection, SettingUpdate, SettingsModel, decode_all, insert_into, upsert_into};
use crate::config::Document;
use crate::error::Result;
use crate::sync::RwLockExt;
use std::sync::RwLock;

/// In-memory document collection (not persisted)
pub struct MemoryModel {
    documents: RwLock<Collection>,
}

impl MemoryModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Collection::new()),
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read_recovered().is_empty()
    }
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsModel for MemoryModel {
    fn insert(&self, document: &Document) -> Result<()> {
        insert_into(&mut self.documents.write_recovered(), document)
    }

    fn upsert(&self, id: &str, update: &SettingUpdate) -> Result<()> {
        upsert_into(&mut self.documents.write_recovered(), id, update);
        Ok(())
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
