//! Common test utilities for settings-registry integration tests
//!
//! Provides a write-counting model, fixtures and helper functions.

#![allow(dead_code)]

use serde_json::Value;
use settings_registry::{
    Document, JsonFileModel, MapEnv, MemoryCache, MemoryModel, RegistryConfig, Result, Setting,
    SettingGroup, SettingUpdate, SettingsModel, SettingsRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Route `log` output through the test harness (`RUST_LOG=debug` to see it)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Recording Model
// =============================================================================

/// Wraps any model and counts the writes that reach it
pub struct RecordingModel<M: SettingsModel = MemoryModel> {
    inner: M,
    inserts: AtomicUsize,
    upserts: AtomicUsize,
}

impl<M: SettingsModel> RecordingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            inserts: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.inserts() + self.upserts()
    }

    pub fn reset_counts(&self) {
        self.inserts.store(0, Ordering::SeqCst);
        self.upserts.store(0, Ordering::SeqCst);
    }

    /// Stored setting by id; panics if missing or a group
    pub fn setting(&self, id: &str) -> Setting {
        self.inner
            .find_one(id)
            .expect("model read failed")
            .and_then(|document| document.as_setting().cloned())
            .unwrap_or_else(|| panic!("setting {id} not stored"))
    }

    /// Stored group by id; panics if missing or a setting
    pub fn group(&self, id: &str) -> SettingGroup {
        self.inner
            .find_one(id)
            .expect("model read failed")
            .and_then(|document| document.as_group().cloned())
            .unwrap_or_else(|| panic!("group {id} not stored"))
    }

    /// Whole stored document as raw JSON
    pub fn raw(&self, id: &str) -> serde_json::Map<String, Value> {
        self.inner
            .find_one(id)
            .expect("model read failed")
            .unwrap_or_else(|| panic!("document {id} not stored"))
            .to_map()
            .expect("document serializes")
    }
}

impl<M: SettingsModel> SettingsModel for RecordingModel<M> {
    fn insert(&self, document: &Document) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(document)
    }

    fn upsert(&self, id: &str, update: &SettingUpdate) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(id, update)
    }

    fn find_one(&self, id: &str) -> Result<Option<Document>> {
        self.inner.find_one(id)
    }

    fn find(&self) -> Result<Vec<Document>> {
        self.inner.find()
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// A registry over an in-memory model, as after one process start
pub struct TestFixture {
    pub model: Arc<RecordingModel>,
    pub registry: SettingsRegistry,
}

impl TestFixture {
    /// Fresh store, empty environment
    pub fn new() -> Self {
        Self::with_env(MapEnv::new())
    }

    /// Fresh store with the given environment
    pub fn with_env(env: MapEnv) -> Self {
        Self::with_config(RegistryConfig::builder().env_source(env).build())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        init_logging();
        let model = Arc::new(RecordingModel::new(MemoryModel::new()));
        let registry = SettingsRegistry::new(config, model.clone(), Arc::new(MemoryCache::new()));
        Self { model, registry }
    }

    /// Simulate a restart: same store, fresh cache warmed from it, fresh counters
    pub fn restart(self, env: MapEnv) -> Self {
        let config = RegistryConfig::builder().env_source(env).build();
        let cache = MemoryCache::load(self.model.as_ref()).expect("cache warm-up failed");
        self.model.reset_counts();
        let registry = SettingsRegistry::new(config, self.model.clone(), Arc::new(cache));
        Self {
            model: self.model,
            registry,
        }
    }
}

/// A registry over a JSON file in a temp directory
pub struct FileFixture {
    pub temp_dir: TempDir,
}

impl FileFixture {
    pub fn new() -> Self {
        init_logging();
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join("settings.json")
    }

    /// Open the file and build a registry over it, as a process start would
    pub fn boot(&self, env: MapEnv) -> (Arc<JsonFileModel>, SettingsRegistry) {
        let model = Arc::new(JsonFileModel::open(self.settings_path()).expect("open model"));
        let cache = MemoryCache::load(model.as_ref()).expect("cache warm-up failed");
        let config = RegistryConfig::builder().env_source(env).build();
        let registry = SettingsRegistry::new(config, model.clone(), Arc::new(cache));
        (model, registry)
    }

    /// Raw documents of the settings file
    pub fn read_file(&self) -> Vec<Value> {
        let content = std::fs::read_to_string(self.settings_path()).expect("read settings file");
        serde_json::from_str(&content).expect("settings file is a JSON array")
    }
}
