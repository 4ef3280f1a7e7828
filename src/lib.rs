//! # settings-registry
//!
//! Declare application settings in code and keep a persistent store in sync
//! with those declarations across restarts.
//!
//! ## Features
//!
//! - **Declarative settings**: `add` one setting, or `add_group_with` a whole
//!   group with nested `section`/`with` builders that share preset options
//! - **Reconciliation**: stored values survive restarts; type, group, label
//!   and metadata changes in code are re-synced without touching the value
//! - **Environment overrides**: `OVERWRITE_SETTING_{id}` forces a value on every
//!   boot, `{id}` seeds it on first insert
//! - **Operator lists**: `SETTINGS_BLOCKED`, `SETTINGS_HIDDEN` and
//!   `SETTINGS_REQUIRED_ON_WIZARD` flag settings by id
//! - **Pluggable storage**: in-memory and JSON file models behind one trait
//!
//! ## Quick Start
//!
//! ```rust
//! use settings_registry::{
//!     GroupOptions, MemoryCache, MemoryModel, RegistryConfig, SettingOptions, SettingType,
//!     SettingsModel, SettingsRegistry,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn example() -> settings_registry::Result<()> {
//! let model = Arc::new(MemoryModel::new());
//! let cache = Arc::new(MemoryCache::load(model.as_ref())?);
//! let mut registry = SettingsRegistry::new(RegistryConfig::from_env(), model.clone(), cache);
//!
//! registry.add_group_with("Accounts", GroupOptions::new(), |group| {
//!     group.add(
//!         "Accounts_AllowAnonymousRead",
//!         json!(false),
//!         SettingOptions::new().setting_type(SettingType::Boolean).public(true),
//!     )?;
//!     group.section("Registration", |section| {
//!         section.add("Accounts_RegistrationForm", json!("Public"), SettingOptions::new())
//!     })
//! })?;
//!
//! let stored = model.find_one("Accounts_RegistrationForm")?.expect("inserted");
//! assert_eq!(stored.as_setting().and_then(|s| s.section.as_deref()), Some("Registration"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Persistent Storage
//!
//! ```rust,no_run
//! use settings_registry::{JsonFileModel, MemoryCache, RegistryConfig, SettingsRegistry};
//! use std::sync::Arc;
//!
//! # fn example() -> settings_registry::Result<()> {
//! let model = Arc::new(JsonFileModel::open("data/settings.json")?);
//! let cache = Arc::new(MemoryCache::load(model.as_ref())?);
//! let registry = SettingsRegistry::new(RegistryConfig::from_env(), model, cache);
//! # Ok(())
//! # }
//! ```

// Core modules
mod cache;
mod error;
mod registry;
mod sync;

// Grouped modules
pub mod config;
pub mod storage;

// Re-exports from core
pub use cache::{MemoryCache, SettingsCache};
pub use error::{Error, Result};
pub use registry::{
    EnvironmentHandler, GroupBuilder, IGNORED_KEYS, OVERWRITE_PREFIX, SectionBuilder,
    SettingsRegistry, SorterState, drift_update, group_defaults, has_structural_drift,
    setting_defaults,
};
pub use storage::{
    JsonFileModel, JsonStorage, MemoryModel, SettingUpdate, SettingsModel, StorageBackend,
};

// Re-exports from config
pub use config::{
    BLOCKED_ENV, DEVELOPMENT_ENV, Document, EnvSource, GROUP_FIELDS, GroupOptions, HIDDEN_ENV,
    MapEnv, ProcessEnv, REQUIRED_ON_WIZARD_ENV, RegistryConfig, RegistryConfigBuilder,
    SETTING_FIELDS, Setting, SettingGroup, SettingLists, SettingOptions, SettingType, ValueSource,
    validate_setting,
};
