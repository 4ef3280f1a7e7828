//! Setting documents and the value validator
//!
//! # Overview
//!
//! Two kinds of documents live in the settings collection:
//!
//! - [`Setting`] - one configuration value plus everything needed to render and
//!   reconcile it (type, group, section, sort order, visibility flags, provenance)
//! - [`SettingGroup`] - a named container of settings, stored as a pseudo-setting
//!   whose `type` is `"group"`
//!
//! Both serialize to the field names used by the persisted collection
//! (`_id`, `i18nLabel`, `valueSource`, `_updatedAt`, ...). Anything a declaration
//! carries beyond the well-known fields (select options, placeholders, alerts)
//! is kept in the flattened `metadata` map and round-trips untouched.
//!
//! # Validation
//!
//! [`validate_setting`] checks a value against its declared [`SettingType`].
//! The registry only uses it for development diagnostics; a mismatch never
//! blocks registration.
//!
//! ```
//! use settings_registry::{validate_setting, SettingType};
//! use serde_json::json;
//!
//! assert!(validate_setting("Site_Name", SettingType::String, &json!("Acme")).is_ok());
//! assert!(validate_setting("Site_Name", SettingType::String, &json!(42)).is_err());
//! ```

use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// =============================================================================
// Setting Types
// =============================================================================

/// Declared type of a setting, used for rendering and value conversion
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SettingType {
    /// Free text
    #[default]
    String,
    /// On/off toggle
    Boolean,
    /// Numeric value
    Int,
    /// One value out of a list of options
    Select,
    /// Several values out of a list of options
    MultiSelect,
    /// Language code
    Language,
    /// Masked text
    Password,
    /// URL relative to the site root
    RelativeUrl,
    /// Color value or variable
    Color,
    /// Font family
    Font,
    /// Source code snippet
    Code,
    /// Button triggering a server-side method
    Action,
    /// Uploaded asset descriptor
    Asset,
    /// Room picker
    RoomPick,
    /// Date (RFC 3339 text)
    Date,
    /// Duration
    Timespan,
    /// Value resolved from a remote lookup endpoint
    Lookup,
    /// Numeric slider
    Range,
    /// Group pseudo-setting
    Group,
}

impl SettingType {
    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingType::String => "string",
            SettingType::Boolean => "boolean",
            SettingType::Int => "int",
            SettingType::Select => "select",
            SettingType::MultiSelect => "multiSelect",
            SettingType::Language => "language",
            SettingType::Password => "password",
            SettingType::RelativeUrl => "relativeUrl",
            SettingType::Color => "color",
            SettingType::Font => "font",
            SettingType::Code => "code",
            SettingType::Action => "action",
            SettingType::Asset => "asset",
            SettingType::RoomPick => "roomPick",
            SettingType::Date => "date",
            SettingType::Timespan => "timespan",
            SettingType::Lookup => "lookup",
            SettingType::Range => "range",
            SettingType::Group => "group",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current value of a setting came from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueSource {
    /// The default declared in code
    #[default]
    #[serde(rename = "packageValue")]
    PackageValue,
    /// An environment variable override
    #[serde(rename = "processEnvValue")]
    ProcessEnvValue,
    /// A value edited and stored after declaration
    #[serde(rename = "value")]
    Value,
}

/// Document keys of [`Setting`]; metadata may not use them
pub const SETTING_FIELDS: &[&str] = &[
    "_id",
    "type",
    "value",
    "packageValue",
    "processEnvValue",
    "valueSource",
    "group",
    "section",
    "sorter",
    "i18nLabel",
    "i18nDescription",
    "hidden",
    "blocked",
    "enterprise",
    "invalidValue",
    "modules",
    "requiredOnWizard",
    "public",
    "env",
    "secret",
    "autocomplete",
    "enableQuery",
    "displayQuery",
    "ts",
    "createdAt",
    "_updatedAt",
];

/// Document keys of [`SettingGroup`]; metadata may not use them
pub const GROUP_FIELDS: &[&str] = &[
    "_id",
    "type",
    "i18nLabel",
    "i18nDescription",
    "sorter",
    "hidden",
    "blocked",
    "displayQuery",
    "ts",
];

fn default_true() -> bool {
    true
}

// =============================================================================
// Setting
// =============================================================================

/// A declared or stored setting document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "type")]
    pub setting_type: SettingType,

    /// Value currently served to the application
    pub value: Value,

    /// Value declared in code
    pub package_value: Value,

    /// Value taken from the environment, if an override applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_env_value: Option<Value>,

    #[serde(default)]
    pub value_source: ValueSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Section within `group`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    #[serde(default)]
    pub sorter: i64,

    pub i18n_label: String,

    pub i18n_description: String,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub blocked: bool,

    #[serde(default)]
    pub enterprise: bool,

    /// Value served in place of `value` when the enterprise license is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<Value>,

    /// Licensed modules an enterprise setting belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,

    #[serde(default)]
    pub required_on_wizard: bool,

    #[serde(default)]
    pub public: bool,

    #[serde(default)]
    pub env: bool,

    #[serde(default)]
    pub secret: bool,

    #[serde(default = "default_true")]
    pub autocomplete: bool,

    /// Serialized query enabling this setting in the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_query: Option<String>,

    /// Serialized query controlling whether this setting is displayed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_query: Option<String>,

    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    #[serde(rename = "_updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,

    /// Type-specific display metadata
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Setting {
    /// Get display metadata by key
    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Get display metadata as string
    pub fn get_meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Check the current value against the declared type
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the value does not fit the type.
    pub fn validate(&self) -> Result<()> {
        validate_setting(&self.id, self.setting_type, &self.value)
    }
}

// =============================================================================
// Setting Group
// =============================================================================

/// A group document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingGroup {
    #[serde(rename = "_id")]
    pub id: String,

    /// Always [`SettingType::Group`]
    #[serde(rename = "type")]
    pub setting_type: SettingType,

    pub i18n_label: String,

    pub i18n_description: String,

    #[serde(default)]
    pub sorter: i64,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub blocked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_query: Option<String>,

    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,

    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

// =============================================================================
// Document
// =============================================================================

/// Any document of the settings collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Setting(Setting),
    Group(SettingGroup),
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let is_group = raw.get("type").and_then(Value::as_str) == Some(SettingType::Group.as_str());
        if is_group {
            serde_json::from_value(raw)
                .map(Document::Group)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(raw)
                .map(Document::Setting)
                .map_err(D::Error::custom)
        }
    }
}

impl Document {
    /// Identifier of the document
    pub fn id(&self) -> &str {
        match self {
            Document::Setting(setting) => &setting.id,
            Document::Group(group) => &group.id,
        }
    }

    pub fn as_setting(&self) -> Option<&Setting> {
        match self {
            Document::Setting(setting) => Some(setting),
            Document::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&SettingGroup> {
        match self {
            Document::Group(group) => Some(group),
            Document::Setting(_) => None,
        }
    }

    /// Encode into the raw JSON object stored by persistent models
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or does not produce an object.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Parse(format!(
                "document '{}' serialized to {}",
                self.id(),
                json_kind(&other)
            ))),
        }
    }

    /// Decode a raw JSON object read from a persistent model
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the object is not a valid setting or group.
    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(map)).map_err(|e| Error::Parse(e.to_string()))
    }
}

impl From<Setting> for Document {
    fn from(setting: Setting) -> Self {
        Document::Setting(setting)
    }
}

impl From<SettingGroup> for Document {
    fn from(group: SettingGroup) -> Self {
        Document::Group(group)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Name of the JSON kind of a value, for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a value against a setting type
///
/// Checks:
/// - string-like types (string, password, relativeUrl, language, color, font,
///   code, action, roomPick, group) hold a string
/// - boolean holds a bool, int and range hold a number
/// - select holds a string or a number, multiSelect an array
/// - asset holds an object
/// - date holds an RFC 3339 timestamp
///
/// Other types accept any value.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] describing the expected and actual kinds.
pub fn validate_setting(id: &str, setting_type: SettingType, value: &Value) -> Result<()> {
    let (valid, expected) = match setting_type {
        SettingType::String
        | SettingType::Password
        | SettingType::RelativeUrl
        | SettingType::Language
        | SettingType::Color
        | SettingType::Font
        | SettingType::Code
        | SettingType::Action
        | SettingType::RoomPick
        | SettingType::Group => (value.is_string(), "string"),
        SettingType::Boolean => (value.is_boolean(), "boolean"),
        SettingType::Int | SettingType::Range => (value.is_number(), "number"),
        SettingType::Select => (value.is_string() || value.is_number(), "string or number"),
        SettingType::MultiSelect => (value.is_array(), "array"),
        SettingType::Asset => (value.is_object(), "object"),
        SettingType::Date => (
            value
                .as_str()
                .is_some_and(|text| OffsetDateTime::parse(text, &Rfc3339).is_ok()),
            "RFC 3339 date",
        ),
        SettingType::Timespan | SettingType::Lookup => return Ok(()),
    };

    if valid {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            key: id.to_string(),
            expected: expected.to_string(),
            actual: json_kind(value).to_string(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
