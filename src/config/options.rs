//! Partial declarations passed to `add` and `add_group`
//!
//! Every field is optional: an unset field falls back to the defaults
//! computed when the declaration is turned into a full [`Setting`](super::Setting).
//! Options compose with [`SettingOptions::merge`], where the right-hand side
//! wins key by key. Group builders use this to thread presets such as
//! `group`, `section` or a shared `enable_query` down to every `add` call.
//!
//! ```
//! use settings_registry::{SettingOptions, SettingType};
//!
//! let preset = SettingOptions::new().group("Accounts").setting_type(SettingType::Boolean);
//! let merged = preset.merge(&SettingOptions::new().public(true));
//!
//! assert_eq!(merged.group.as_deref(), Some("Accounts"));
//! assert_eq!(merged.setting_type, Some(SettingType::Boolean));
//! assert_eq!(merged.public, Some(true));
//! ```

use super::schema::SettingType;
use serde_json::{Map, Value};

/// Take `over` if set, otherwise `base`
fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
    over.as_ref().or(base.as_ref()).cloned()
}

fn merge_metadata(base: &Map<String, Value>, over: &Map<String, Value>) -> Map<String, Value> {
    let mut metadata = base.clone();
    metadata.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
    metadata
}

// =============================================================================
// Setting Options
// =============================================================================

/// Optional attributes of a setting declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingOptions {
    pub setting_type: Option<SettingType>,
    pub group: Option<String>,
    pub section: Option<String>,
    pub sorter: Option<i64>,
    pub i18n_label: Option<String>,
    pub i18n_description: Option<String>,
    pub hidden: Option<bool>,
    pub blocked: Option<bool>,
    pub enterprise: Option<bool>,
    pub invalid_value: Option<Value>,
    pub modules: Option<Vec<String>>,
    pub required_on_wizard: Option<bool>,
    pub public: Option<bool>,
    pub env: Option<bool>,
    pub secret: Option<bool>,
    pub autocomplete: Option<bool>,
    /// Query object, serialized to text when the setting is built
    pub enable_query: Option<Value>,
    /// Query object, serialized to text when the setting is built
    pub display_query: Option<Value>,
    /// Type-specific display metadata (select values, placeholder, alert...)
    pub metadata: Map<String, Value>,
}

impl SettingOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of `self`; every field set in `other` wins.
    #[must_use]
    pub fn merge(&self, other: &SettingOptions) -> SettingOptions {
        SettingOptions {
            setting_type: pick(&other.setting_type, &self.setting_type),
            group: pick(&other.group, &self.group),
            section: pick(&other.section, &self.section),
            sorter: pick(&other.sorter, &self.sorter),
            i18n_label: pick(&other.i18n_label, &self.i18n_label),
            i18n_description: pick(&other.i18n_description, &self.i18n_description),
            hidden: pick(&other.hidden, &self.hidden),
            blocked: pick(&other.blocked, &self.blocked),
            enterprise: pick(&other.enterprise, &self.enterprise),
            invalid_value: pick(&other.invalid_value, &self.invalid_value),
            modules: pick(&other.modules, &self.modules),
            required_on_wizard: pick(&other.required_on_wizard, &self.required_on_wizard),
            public: pick(&other.public, &self.public),
            env: pick(&other.env, &self.env),
            secret: pick(&other.secret, &self.secret),
            autocomplete: pick(&other.autocomplete, &self.autocomplete),
            enable_query: pick(&other.enable_query, &self.enable_query),
            display_query: pick(&other.display_query, &self.display_query),
            metadata: merge_metadata(&self.metadata, &other.metadata),
        }
    }

    // =========================================================================
    // Builder setters
    // =========================================================================

    #[must_use]
    pub fn setting_type(mut self, setting_type: SettingType) -> Self {
        self.setting_type = Some(setting_type);
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Pin the sort order instead of taking the next one in scope
    #[must_use]
    pub fn sorter(mut self, sorter: i64) -> Self {
        self.sorter = Some(sorter);
        self
    }

    /// i18n label key (defaults to the setting id)
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.i18n_label = Some(label.into());
        self
    }

    /// i18n description key (defaults to `{id}_Description`)
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.i18n_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    #[must_use]
    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = Some(blocked);
        self
    }

    /// Mark as enterprise-only. An enterprise setting must also set
    /// [`invalid_value`](Self::invalid_value) or registration fails.
    #[must_use]
    pub fn enterprise(mut self, enterprise: bool) -> Self {
        self.enterprise = Some(enterprise);
        self
    }

    #[must_use]
    pub fn invalid_value(mut self, value: impl Into<Value>) -> Self {
        self.invalid_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn required_on_wizard(mut self, required: bool) -> Self {
        self.required_on_wizard = Some(required);
        self
    }

    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    #[must_use]
    pub fn env(mut self, env: bool) -> Self {
        self.env = Some(env);
        self
    }

    #[must_use]
    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = Some(secret);
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = Some(autocomplete);
        self
    }

    #[must_use]
    pub fn enable_query(mut self, query: Value) -> Self {
        self.enable_query = Some(query);
        self
    }

    #[must_use]
    pub fn display_query(mut self, query: Value) -> Self {
        self.display_query = Some(query);
        self
    }

    /// Add display metadata
    #[must_use]
    pub fn meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Add string display metadata
    #[must_use]
    pub fn meta_str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Add boolean display metadata
    #[must_use]
    pub fn meta_bool(mut self, key: &str, value: bool) -> Self {
        self.metadata.insert(key.to_string(), Value::Bool(value));
        self
    }
}

// =============================================================================
// Group Options
// =============================================================================

/// Optional attributes of a group declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupOptions {
    pub i18n_label: Option<String>,
    pub i18n_description: Option<String>,
    pub sorter: Option<i64>,
    pub hidden: Option<bool>,
    pub blocked: Option<bool>,
    pub display_query: Option<Value>,
    pub metadata: Map<String, Value>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.i18n_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.i18n_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn sorter(mut self, sorter: i64) -> Self {
        self.sorter = Some(sorter);
        self
    }

    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = Some(hidden);
        self
    }

    #[must_use]
    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = Some(blocked);
        self
    }

    #[must_use]
    pub fn display_query(mut self, query: Value) -> Self {
        self.display_query = Some(query);
        self
    }

    #[must_use]
    pub fn meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
