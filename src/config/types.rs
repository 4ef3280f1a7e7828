//! Registry configuration and environment access

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Comma-separated ids of settings that cannot be edited
pub const BLOCKED_ENV: &str = "SETTINGS_BLOCKED";
/// Comma-separated ids of settings hidden from the UI
pub const HIDDEN_ENV: &str = "SETTINGS_HIDDEN";
/// Comma-separated ids of settings the setup wizard must ask for
pub const REQUIRED_ON_WIZARD_ENV: &str = "SETTINGS_REQUIRED_ON_WIZARD";
/// Enables development diagnostics when `true` or `1`
pub const DEVELOPMENT_ENV: &str = "SETTINGS_DEVELOPMENT_MODE";

// =============================================================================
// Environment Sources
// =============================================================================

/// Source of environment variables
///
/// Abstracts `std::env` so overrides can be tested and embedded without
/// touching the process environment.
pub trait EnvSource: Send + Sync {
    /// Value of the variable, if set
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

// =============================================================================
// Setting Lists
// =============================================================================

/// Split a comma-separated id list, trimming whitespace and dropping empty entries
fn parse_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
}

/// Ids of blocked, hidden and wizard-required settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingLists {
    blocked: HashSet<String>,
    hidden: HashSet<String>,
    required_on_wizard: HashSet<String>,
}

impl SettingLists {
    pub fn is_blocked(&self, id: &str) -> bool {
        self.blocked.contains(id)
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    pub fn is_required_on_wizard(&self, id: &str) -> bool {
        self.required_on_wizard.contains(id)
    }
}

// =============================================================================
// Registry Config
// =============================================================================

/// Configuration for a [`SettingsRegistry`](crate::SettingsRegistry)
#[derive(Clone)]
pub struct RegistryConfig {
    /// Blocked / hidden / wizard-required ids
    pub lists: SettingLists,

    /// Log validation diagnostics
    pub development: bool,

    /// Environment consulted for value overrides
    pub env_source: Arc<dyn EnvSource>,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("lists", &self.lists)
            .field("development", &self.development)
            .finish_non_exhaustive()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfigBuilder::new().build()
    }
}

impl RegistryConfig {
    /// Create a new builder for RegistryConfig
    ///
    /// # Example
    /// ```rust
    /// use settings_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::builder()
    ///     .blocked(["Site_Url"])
    ///     .hidden(["Log_Level"])
    ///     .development(true)
    ///     .build();
    ///
    /// assert!(config.lists.is_blocked("Site_Url"));
    /// ```
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::new()
    }

    /// Configuration read from the process environment
    pub fn from_env() -> Self {
        RegistryConfigBuilder::new().load_env().build()
    }
}

/// Builder for creating RegistryConfig with a fluent API
#[derive(Clone)]
pub struct RegistryConfigBuilder {
    lists: SettingLists,
    development: bool,
    env_source: Arc<dyn EnvSource>,
}

impl RegistryConfigBuilder {
    pub fn new() -> Self {
        Self {
            lists: SettingLists::default(),
            development: false,
            env_source: Arc::new(ProcessEnv),
        }
    }

    /// Add ids to the blocked list
    pub fn blocked<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists.blocked.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add ids to the hidden list
    pub fn hidden<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists.hidden.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add ids to the wizard-required list
    pub fn required_on_wizard<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists
            .required_on_wizard
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Enable development diagnostics
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Use a custom environment source (default: the process environment)
    pub fn env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Arc::new(source);
        self
    }

    /// Read the id lists and the development flag from the environment source
    ///
    /// Lists are appended to anything configured explicitly.
    pub fn load_env(mut self) -> Self {
        let source = Arc::clone(&self.env_source);
        if let Some(raw) = source.var(BLOCKED_ENV) {
            self.lists.blocked.extend(parse_list(&raw));
        }
        if let Some(raw) = source.var(HIDDEN_ENV) {
            self.lists.hidden.extend(parse_list(&raw));
        }
        if let Some(raw) = source.var(REQUIRED_ON_WIZARD_ENV) {
            self.lists.required_on_wizard.extend(parse_list(&raw));
        }
        if let Some(raw) = source.var(DEVELOPMENT_ENV) {
            let raw = raw.trim();
            self.development = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        self
    }

    pub fn build(self) -> RegistryConfig {
        RegistryConfig {
            lists: self.lists,
            development: self.development,
            env_source: self.env_source,
        }
    }
}

impl Default for RegistryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
