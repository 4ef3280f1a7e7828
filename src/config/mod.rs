//! Core configuration and document types
//!
//! This module contains the foundational types of the registry:
//! - `RegistryConfig` - blocked/hidden/wizard lists, development flag, environment source
//! - `Setting` / `SettingGroup` / `Document` - the persisted documents
//! - `SettingOptions` / `GroupOptions` - partial declarations merged by group builders

mod options;
mod schema;
mod types;

pub use options::{GroupOptions, SettingOptions};

pub use schema::{
    Document, GROUP_FIELDS, SETTING_FIELDS, Setting, SettingGroup, SettingType, ValueSource,
    validate_setting,
};

pub use types::{
    BLOCKED_ENV, DEVELOPMENT_ENV, EnvSource, HIDDEN_ENV, MapEnv, ProcessEnv,
    REQUIRED_ON_WIZARD_ENV, RegistryConfig, RegistryConfigBuilder, SettingLists,
};
