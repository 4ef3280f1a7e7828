//! Settings registry
//!
//! This module contains the [`SettingsRegistry`], the single point where what
//! the code declares about a setting is reconciled against what is stored.
//!
//! # Reconciliation
//!
//! Every [`add`](SettingsRegistry::add) builds the fully-defaulted setting the
//! code describes, applies `OVERWRITE_SETTING_{id}` from the environment, and
//! compares the result with the cached document:
//!
//! 1. stored, and type/group/labels/flags/metadata differ: re-sync every field
//!    except `value` (stale keys are removed)
//! 2. stored, and the environment overwrote the value: write the overwritten
//!    document if its value differs from the stored one
//! 3. stored otherwise: leave it alone, the stored value wins
//! 4. not stored: insert it (seeded from `{id}` in the environment unless an
//!    overwrite applied) and mirror it into the cache
//!
//! At most one write reaches the model per call.

mod compare;
mod defaults;
mod env;
mod group;
mod sorter;

pub use compare::{IGNORED_KEYS, drift_update, has_structural_drift};
pub use defaults::{group_defaults, setting_defaults};
pub use env::{EnvironmentHandler, OVERWRITE_PREFIX};
pub use group::{GroupBuilder, SectionBuilder};
pub use sorter::SorterState;

use crate::cache::SettingsCache;
use crate::config::{
    Document, GroupOptions, RegistryConfig, Setting, SettingOptions, SettingType, validate_setting,
};
use crate::error::{Error, Result};
use crate::storage::{SettingUpdate, SettingsModel};
use log::{debug, error, info};
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;

/// Declares settings and groups and reconciles them with the persistent model.
///
/// Declaration runs once, serially, at startup. The registry owns its sort
/// counters; the model and the cache are shared collaborators it only
/// reaches through their traits.
///
/// # Example
///
/// ```rust
/// use settings_registry::{
///     MemoryCache, MemoryModel, RegistryConfig, SettingOptions, SettingsRegistry, GroupOptions,
/// };
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let model = Arc::new(MemoryModel::new());
/// let cache = Arc::new(MemoryCache::new());
/// let mut registry = SettingsRegistry::new(RegistryConfig::default(), model.clone(), cache);
///
/// registry.add_group_with("Accounts", GroupOptions::new(), |group| {
///     group.add("Accounts_EmailOrUsernamePlaceholder", json!("user@email"), SettingOptions::new())
/// })?;
///
/// assert_eq!(model.len(), 2);
/// # Ok::<(), settings_registry::Error>(())
/// ```
pub struct SettingsRegistry {
    config: RegistryConfig,
    model: Arc<dyn SettingsModel>,
    cache: Arc<dyn SettingsCache>,
    env_handler: EnvironmentHandler,
    setting_sorters: SorterState,
    group_sorters: SorterState,
}

impl SettingsRegistry {
    pub fn new(
        config: RegistryConfig,
        model: Arc<dyn SettingsModel>,
        cache: Arc<dyn SettingsCache>,
    ) -> Self {
        let env_handler = EnvironmentHandler::new(Arc::clone(&config.env_source));
        Self {
            config,
            model,
            cache,
            env_handler,
            setting_sorters: SorterState::new(),
            group_sorters: SorterState::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Sort counters of setting scopes (`group` or `group_section`)
    pub fn setting_sorters(&self) -> &SorterState {
        &self.setting_sorters
    }

    /// Sort counters of group declarations
    pub fn group_sorters(&self) -> &SorterState {
        &self.group_sorters
    }

    /// Declare a setting, or reconcile it with its stored document.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArguments`] if `id` is empty or `value` is null
    /// - [`Error::MissingInvalidValue`] if the setting is enterprise without an
    ///   `invalid_value`; nothing is written in that case
    /// - any error of the model or the cache
    pub fn add(&mut self, id: &str, value: Value, options: SettingOptions) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidArguments {
                id: id.to_string(),
                reason: "setting id must not be empty".into(),
            });
        }
        if value.is_null() {
            return Err(Error::InvalidArguments {
                id: id.to_string(),
                reason: "value must not be null".into(),
            });
        }

        let scope = SorterState::scope_key(options.group.as_deref(), options.section.as_deref());
        let options = match scope.map(|scope| self.setting_sorters.index_of(&scope, id)) {
            Some(sorter) if options.sorter.is_none() => options.sorter(sorter),
            _ => options,
        };

        let from_code = setting_defaults(
            id,
            value,
            options,
            &self.config.lists,
            OffsetDateTime::now_utc(),
        );

        if from_code.enterprise && from_code.invalid_value.is_none() {
            error!("Enterprise setting {id} is missing the invalidValue option");
            return Err(Error::MissingInvalidValue(id.to_string()));
        }

        let stored = self.cache.get_setting(id)?;
        let overwritten = self.env_handler.overwrite_setting(&from_code);

        self.diagnose("code", id, from_code.setting_type, &from_code.value);

        match stored {
            Some(stored) => self.reconcile(&stored, &from_code, overwritten),
            None => self.insert_setting(from_code, overwritten),
        }
    }

    /// Decide what to write for a setting that is already stored
    fn reconcile(
        &self,
        stored: &Setting,
        from_code: &Setting,
        overwritten: Option<Setting>,
    ) -> Result<()> {
        let id = from_code.id.as_str();
        let declared = overwritten.as_ref().unwrap_or(from_code);

        if has_structural_drift(stored, declared)? {
            debug!("Setting {id} changed shape, re-syncing everything but its value");
            return self.model.upsert(id, &drift_update(stored, declared)?);
        }

        match overwritten {
            Some(overwritten) if overwritten.value != stored.value => {
                info!("Setting {id} overwritten from the environment");
                let update = SettingUpdate::set_all(Document::Setting(overwritten).to_map()?);
                self.model.upsert(id, &update)
            }
            Some(_) => {
                debug!("Setting {id} already holds its overwritten value");
                Ok(())
            }
            None => {
                self.diagnose("stored", id, from_code.setting_type, &stored.value);
                Ok(())
            }
        }
    }

    /// Insert a setting that has no stored document yet
    fn insert_setting(&self, from_code: Setting, overwritten: Option<Setting>) -> Result<()> {
        let setting = match overwritten {
            Some(overwritten) => overwritten,
            None => self
                .env_handler
                .override_setting(&from_code)
                .unwrap_or(from_code),
        };

        info!("Inserting setting {}", setting.id);
        let document = Document::Setting(setting);
        self.model.insert(&document)?;
        self.cache.set(document)
    }

    /// Log a value that does not fit its type; development mode only
    fn diagnose(&self, origin: &str, id: &str, setting_type: SettingType, value: &Value) {
        if !self.config.development {
            return;
        }
        if let Err(e) = validate_setting(id, setting_type, value) {
            error!("Invalid setting {origin} {id}: {e}");
        }
    }

    /// Declare a group without declaring its settings.
    ///
    /// A group that is already cached is left as stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGroupArguments`] if `id` is empty, or any error
    /// of the model or the cache.
    pub fn add_group(&mut self, id: &str, options: GroupOptions) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidGroupArguments {
                id: id.to_string(),
                reason: "group id must not be empty".into(),
            });
        }

        let sorter = self.group_sorters.next(id);
        let options = if options.sorter.is_none() {
            options.sorter(sorter)
        } else {
            options
        };

        if self.cache.has(id)? {
            debug!("Group {id} already stored, leaving it untouched");
            return Ok(());
        }

        let group = group_defaults(
            id,
            options,
            &self.config.lists,
            OffsetDateTime::now_utc(),
        );
        info!("Inserting group {id}");
        let document = Document::Group(group);
        self.model.insert(&document)?;
        self.cache.set(document)
    }

    /// Declare a group and its settings.
    ///
    /// `build` receives a [`GroupBuilder`] whose `add` calls are preset with
    /// `group: id`.
    ///
    /// # Errors
    ///
    /// Same as [`add_group`](Self::add_group), plus the first error returned
    /// inside `build`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use settings_registry::*;
    /// # use serde_json::json;
    /// # use std::sync::Arc;
    /// # let mut registry = SettingsRegistry::new(
    /// #     RegistryConfig::default(),
    /// #     Arc::new(MemoryModel::new()),
    /// #     Arc::new(MemoryCache::new()),
    /// # );
    /// registry.add_group_with("General", GroupOptions::new(), |group| {
    ///     group.add("Site_Url", json!("http://localhost:3000"), SettingOptions::new().public(true))?;
    ///     group.section("REST API", |section| {
    ///         section.with(SettingOptions::new().setting_type(SettingType::Int), |ints| {
    ///             ints.add("API_Upper_Count_Limit", json!(100), SettingOptions::new())?;
    ///             ints.add("API_Default_Count", json!(50), SettingOptions::new())
    ///         })
    ///     })
    /// })?;
    /// # Ok::<(), settings_registry::Error>(())
    /// ```
    pub fn add_group_with<F>(&mut self, id: &str, options: GroupOptions, build: F) -> Result<()>
    where
        F: FnOnce(&mut GroupBuilder<'_>) -> Result<()>,
    {
        self.add_group(id, options)?;
        let preset = SettingOptions::new().group(id);
        build(&mut GroupBuilder::new(self, preset))
    }
}
