//! Environment variable overrides for declared settings
//!
//! Two lookups exist for a setting `Foo`:
//! - `OVERWRITE_SETTING_Foo` overwrites the value on every boot, even when a
//!   value is already stored
//! - `Foo` only seeds the value the first time the setting is inserted

use crate::config::{EnvSource, Setting, SettingType, ValueSource};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

/// Prefix of variables that overwrite stored values
pub const OVERWRITE_PREFIX: &str = "OVERWRITE_SETTING_";

/// Handles environment variable lookups and parsing
pub struct EnvironmentHandler {
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub fn new(source: Arc<dyn EnvSource>) -> Self {
        Self { source }
    }

    /// Apply `OVERWRITE_SETTING_{id}`
    ///
    /// Returns `None` when the variable is unset, empty, unconvertible or
    /// equal to the current value.
    pub fn overwrite_setting(&self, setting: &Setting) -> Option<Setting> {
        self.apply(setting, &format!("{OVERWRITE_PREFIX}{}", setting.id))
    }

    /// Apply `{id}` to a setting about to be inserted for the first time
    pub fn override_setting(&self, setting: &Setting) -> Option<Setting> {
        self.apply(setting, &setting.id)
    }

    fn apply(&self, setting: &Setting, var_name: &str) -> Option<Setting> {
        let raw = self.source.var(var_name).filter(|raw| !raw.is_empty())?;
        let value = convert_value(var_name, setting.setting_type, &raw)?;
        if value == setting.value {
            return None;
        }

        debug!("Setting {} taken from environment variable {var_name}", setting.id);
        let mut overwritten = setting.clone();
        overwritten.process_env_value = Some(value.clone());
        overwritten.value = value;
        overwritten.value_source = ValueSource::ProcessEnvValue;
        Some(overwritten)
    }
}

/// Convert raw environment text to a value of the declared type
fn convert_value(var_name: &str, setting_type: SettingType, raw: &str) -> Option<Value> {
    match setting_type {
        SettingType::Boolean => Some(Value::Bool(raw.trim().eq_ignore_ascii_case("true"))),
        SettingType::Int | SettingType::Range => {
            let text = raw.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Some(Value::Number(n.into()));
            }
            let number = text
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64);
            if number.is_none() {
                warn!("Ignoring {var_name}: '{raw}' is not a number");
            }
            number.map(Value::Number)
        }
        SettingType::MultiSelect | SettingType::Asset => match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring {var_name}: expected JSON for {setting_type}: {e}");
                None
            }
        },
        _ => Some(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapEnv, SettingLists, SettingOptions};
    use crate::registry::setting_defaults;
    use serde_json::json;
    use time::OffsetDateTime;

    fn declared(id: &str, setting_type: SettingType, value: Value) -> Setting {
        setting_defaults(
            id,
            value,
            SettingOptions::new().setting_type(setting_type),
            &SettingLists::default(),
            OffsetDateTime::now_utc(),
        )
    }

    fn handler(env: MapEnv) -> EnvironmentHandler {
        EnvironmentHandler::new(Arc::new(env))
    }

    #[test]
    fn test_overwrite_sets_provenance() {
        let handler = handler(MapEnv::new().with("OVERWRITE_SETTING_Site_Name", "Acme"));
        let setting = declared("Site_Name", SettingType::String, json!("Rocket"));

        let overwritten = handler.overwrite_setting(&setting).unwrap();

        assert_eq!(overwritten.value, json!("Acme"));
        assert_eq!(overwritten.process_env_value, Some(json!("Acme")));
        assert_eq!(overwritten.value_source, ValueSource::ProcessEnvValue);
        assert_eq!(overwritten.package_value, json!("Rocket"));
    }

    #[test]
    fn test_overwrite_ignores_plain_id_variable() {
        let handler = handler(MapEnv::new().with("Site_Name", "Acme"));
        let setting = declared("Site_Name", SettingType::String, json!("Rocket"));

        assert!(handler.overwrite_setting(&setting).is_none());
        assert_eq!(
            handler.override_setting(&setting).map(|s| s.value),
            Some(json!("Acme"))
        );
    }

    #[test]
    fn test_equal_value_is_not_an_override() {
        let handler = handler(MapEnv::new().with("OVERWRITE_SETTING_Enabled", "TRUE"));
        let setting = declared("Enabled", SettingType::Boolean, json!(true));

        assert!(handler.overwrite_setting(&setting).is_none());
    }

    #[test]
    fn test_empty_variable_is_ignored() {
        let handler = handler(MapEnv::new().with("OVERWRITE_SETTING_Site_Name", ""));
        let setting = declared("Site_Name", SettingType::String, json!("Rocket"));

        assert!(handler.overwrite_setting(&setting).is_none());
    }

    #[test]
    fn test_convert_by_type() {
        assert_eq!(
            convert_value("V", SettingType::Boolean, "yes"),
            Some(json!(false))
        );
        assert_eq!(convert_value("V", SettingType::Int, " 42 "), Some(json!(42)));
        assert_eq!(convert_value("V", SettingType::Int, "1.5"), Some(json!(1.5)));
        assert_eq!(convert_value("V", SettingType::Int, "many"), None);
        assert_eq!(
            convert_value("V", SettingType::MultiSelect, r#"["a","b"]"#),
            Some(json!(["a", "b"]))
        );
        assert_eq!(convert_value("V", SettingType::MultiSelect, "a,b"), None);
        assert_eq!(
            convert_value("V", SettingType::Color, "#fff"),
            Some(json!("#fff"))
        );
    }
}
