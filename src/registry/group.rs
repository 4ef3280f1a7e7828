//! Scoped builders handed to `add_group_with` callbacks
//!
//! Each builder carries an immutable preset of [`SettingOptions`]. Nesting
//! (`with`, `section`) produces a child builder with a new merged preset;
//! nothing is shared or mutated between levels. At `add` time the call-site
//! options are merged on top of the preset, so explicit options always win.

use super::SettingsRegistry;
use crate::config::SettingOptions;
use crate::error::Result;
use serde_json::Value;

/// Builder scoped to a group
pub struct GroupBuilder<'r> {
    registry: &'r mut SettingsRegistry,
    preset: SettingOptions,
}

impl<'r> GroupBuilder<'r> {
    pub(crate) fn new(registry: &'r mut SettingsRegistry, preset: SettingOptions) -> Self {
        Self { registry, preset }
    }

    /// Options every `add` in this scope starts from
    pub fn preset(&self) -> &SettingOptions {
        &self.preset
    }

    /// Declare a setting in this scope
    ///
    /// # Errors
    ///
    /// Propagates any error from [`SettingsRegistry::add`].
    pub fn add(&mut self, id: &str, value: Value, options: SettingOptions) -> Result<()> {
        self.registry.add(id, value, self.preset.merge(&options))
    }

    /// Declare settings in a section of this group
    ///
    /// # Errors
    ///
    /// Propagates the first error returned inside `build`.
    pub fn section<F>(&mut self, name: &str, build: F) -> Result<()>
    where
        F: FnOnce(&mut SectionBuilder<'_>) -> Result<()>,
    {
        let preset = self.preset.merge(&SettingOptions::new().section(name));
        build(&mut SectionBuilder::new(&mut *self.registry, preset))
    }

    /// Declare settings sharing extra preset options
    ///
    /// # Errors
    ///
    /// Propagates the first error returned inside `build`.
    pub fn with<F>(&mut self, options: SettingOptions, build: F) -> Result<()>
    where
        F: FnOnce(&mut GroupBuilder<'_>) -> Result<()>,
    {
        let preset = self.preset.merge(&options);
        build(&mut GroupBuilder::new(&mut *self.registry, preset))
    }
}

/// Builder scoped to a section of a group. Sections do not nest.
pub struct SectionBuilder<'r> {
    registry: &'r mut SettingsRegistry,
    preset: SettingOptions,
}

impl<'r> SectionBuilder<'r> {
    fn new(registry: &'r mut SettingsRegistry, preset: SettingOptions) -> Self {
        Self { registry, preset }
    }

    pub fn preset(&self) -> &SettingOptions {
        &self.preset
    }

    /// Declare a setting in this section
    ///
    /// # Errors
    ///
    /// Propagates any error from [`SettingsRegistry::add`].
    pub fn add(&mut self, id: &str, value: Value, options: SettingOptions) -> Result<()> {
        self.registry.add(id, value, self.preset.merge(&options))
    }

    /// Declare settings sharing extra preset options
    ///
    /// # Errors
    ///
    /// Propagates the first error returned inside `build`.
    pub fn with<F>(&mut self, options: SettingOptions, build: F) -> Result<()>
    where
        F: FnOnce(&mut SectionBuilder<'_>) -> Result<()>,
    {
        let preset = self.preset.merge(&options);
        build(&mut SectionBuilder::new(&mut *self.registry, preset))
    }
}
