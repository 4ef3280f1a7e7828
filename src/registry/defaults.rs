//! Fully-defaulted documents built from partial declarations

use crate::config::{
    GROUP_FIELDS, GroupOptions, SETTING_FIELDS, Setting, SettingGroup, SettingLists,
    SettingOptions, SettingType, ValueSource,
};
use log::warn;
use serde_json::{Map, Value};
use time::OffsetDateTime;

fn description_key(id: &str) -> String {
    format!("{id}_Description")
}

/// Drop metadata entries that would shadow a document field once flattened
fn display_metadata(
    id: &str,
    metadata: Map<String, Value>,
    fields: &[&str],
) -> Map<String, Value> {
    metadata
        .into_iter()
        .filter(|(key, _)| {
            let reserved = fields.contains(&key.as_str());
            if reserved {
                warn!("Ignoring metadata '{key}' of {id}: it names a document field");
            }
            !reserved
        })
        .collect()
}

/// Build the setting a declaration describes
///
/// Unset options take their defaults: type `string`, label `id`, description
/// `{id}_Description`, sorter 0, autocomplete on, every other flag off.
/// `hidden`, `blocked` and `required_on_wizard` are also switched on by
/// membership in the corresponding list. Query objects are stored as JSON text.
/// Metadata keys that name a document field are dropped.
pub fn setting_defaults(
    id: &str,
    value: Value,
    options: SettingOptions,
    lists: &SettingLists,
    now: OffsetDateTime,
) -> Setting {
    Setting {
        id: id.to_string(),
        setting_type: options.setting_type.unwrap_or_default(),
        package_value: value.clone(),
        value,
        process_env_value: None,
        value_source: ValueSource::PackageValue,
        group: options.group,
        section: options.section,
        sorter: options.sorter.unwrap_or(0),
        i18n_label: options.i18n_label.unwrap_or_else(|| id.to_string()),
        i18n_description: options
            .i18n_description
            .unwrap_or_else(|| description_key(id)),
        hidden: options.hidden.unwrap_or(false) || lists.is_hidden(id),
        blocked: options.blocked.unwrap_or(false) || lists.is_blocked(id),
        enterprise: options.enterprise.unwrap_or(false),
        invalid_value: options.invalid_value,
        modules: options.modules,
        required_on_wizard: options.required_on_wizard.unwrap_or(false)
            || lists.is_required_on_wizard(id),
        public: options.public.unwrap_or(false),
        env: options.env.unwrap_or(false),
        secret: options.secret.unwrap_or(false),
        autocomplete: options.autocomplete.unwrap_or(true),
        enable_query: options.enable_query.map(|query| query.to_string()),
        display_query: options.display_query.map(|query| query.to_string()),
        ts: now,
        created_at: now,
        updated_at: now,
        metadata: display_metadata(id, options.metadata, SETTING_FIELDS),
    }
}

/// Build the group a declaration describes
pub fn group_defaults(
    id: &str,
    options: GroupOptions,
    lists: &SettingLists,
    now: OffsetDateTime,
) -> SettingGroup {
    SettingGroup {
        id: id.to_string(),
        setting_type: SettingType::Group,
        i18n_label: options.i18n_label.unwrap_or_else(|| id.to_string()),
        i18n_description: options
            .i18n_description
            .unwrap_or_else(|| description_key(id)),
        sorter: options.sorter.unwrap_or(0),
        hidden: options.hidden.unwrap_or(false) || lists.is_hidden(id),
        blocked: options.blocked.unwrap_or(false) || lists.is_blocked(id),
        display_query: options.display_query.map(|query| query.to_string()),
        ts: now,
        metadata: display_metadata(id, options.metadata, GROUP_FIELDS),
    }
}
