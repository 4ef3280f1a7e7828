//! Setting Reconciliation Integration Tests
//!
//! Tests for `SettingsRegistry::add` across restarts:
//! - First insert and idempotent re-declaration
//! - Structural drift re-sync that keeps the stored value
//! - Environment overwrite and override-default
//! - Enterprise validation and argument errors
//! - Operator lists and development diagnostics

mod common;

use common::TestFixture;
use serde_json::json;
use settings_registry::{
    Error, MapEnv, RegistryConfig, SettingOptions, SettingType, SettingUpdate, SettingsModel,
    ValueSource,
};

fn max_size_options() -> SettingOptions {
    SettingOptions::new()
        .setting_type(SettingType::Int)
        .group("Message")
        .public(true)
}

/// Simulate an admin editing the value through the UI
fn edit_value(fixture: &TestFixture, id: &str, value: serde_json::Value) {
    let mut update = SettingUpdate::default();
    update.set.insert("value".into(), value);
    update.set.insert("valueSource".into(), json!("value"));
    fixture.model.upsert(id, &update).unwrap();
}

// =============================================================================
// First Insert & Idempotence
// =============================================================================

#[test]
fn test_first_insert_stores_fully_defaulted_setting() {
    let mut fixture = TestFixture::new();

    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();

    let setting = fixture.model.setting("Message_MaxAllowedSize");
    assert_eq!(setting.value, json!(5000));
    assert_eq!(setting.package_value, json!(5000));
    assert_eq!(setting.value_source, ValueSource::PackageValue);
    assert_eq!(setting.setting_type, SettingType::Int);
    assert_eq!(setting.group.as_deref(), Some("Message"));
    assert_eq!(setting.i18n_label, "Message_MaxAllowedSize");
    assert_eq!(setting.i18n_description, "Message_MaxAllowedSize_Description");
    assert!(setting.public);
    assert!(!setting.hidden);
    assert_eq!(fixture.model.inserts(), 1);
}

#[test]
fn test_redeclaring_in_same_boot_writes_nothing() {
    let mut fixture = TestFixture::new();

    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();
    let first = fixture.model.raw("Site_Name");

    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();

    assert_eq!(fixture.model.writes(), 1);
    assert_eq!(fixture.model.raw("Site_Name"), first);
}

#[test]
fn test_redeclaring_grouped_setting_in_same_boot_keeps_sort_order() {
    let mut fixture = TestFixture::new();

    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();
    let first = fixture.model.raw("Message_MaxAllowedSize");

    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();
    fixture
        .registry
        .add("Message_AllowEditing", json!(true), SettingOptions::new().group("Message"))
        .unwrap();

    assert_eq!(fixture.model.upserts(), 0);
    assert_eq!(fixture.model.raw("Message_MaxAllowedSize"), first);
    assert_eq!(fixture.model.setting("Message_MaxAllowedSize").sorter, 0);
    assert_eq!(fixture.model.setting("Message_AllowEditing").sorter, 1);
}

#[test]
fn test_redeclaring_after_restart_writes_nothing() {
    let mut fixture = TestFixture::new();
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();
    let first = fixture.model.raw("Message_MaxAllowedSize");

    let mut fixture = fixture.restart(MapEnv::new());
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();

    assert_eq!(fixture.model.writes(), 0);
    assert_eq!(fixture.model.raw("Message_MaxAllowedSize"), first);
}

#[test]
fn test_metadata_named_like_a_field_is_dropped() {
    let mut fixture = TestFixture::new();

    fixture
        .registry
        .add(
            "Site_Name",
            json!("declared"),
            SettingOptions::new()
                .meta("value", json!("from metadata"))
                .meta_str("placeholder", "Acme"),
        )
        .unwrap();
    fixture
        .registry
        .add(
            "Site_Port",
            json!(3000),
            SettingOptions::new()
                .setting_type(SettingType::Int)
                .meta("type", json!("boolean")),
        )
        .unwrap();

    let name = fixture.model.setting("Site_Name");
    assert_eq!(name.value, json!("declared"));
    assert_eq!(name.get_meta_str("placeholder"), Some("Acme"));
    let port = fixture.model.setting("Site_Port");
    assert_eq!(port.setting_type, SettingType::Int);
    assert_eq!(port.get_meta("type"), None);
}

// =============================================================================
// Stored Value Wins
// =============================================================================

#[test]
fn test_new_code_default_does_not_replace_stored_value() {
    let mut fixture = TestFixture::new();
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();
    edit_value(&fixture, "Message_MaxAllowedSize", json!(1200));

    let mut fixture = fixture.restart(MapEnv::new());
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(9000), max_size_options())
        .unwrap();

    let setting = fixture.model.setting("Message_MaxAllowedSize");
    assert_eq!(setting.value, json!(1200));
    assert_eq!(fixture.model.writes(), 0);
}

// =============================================================================
// Structural Drift
// =============================================================================

#[test]
fn test_structural_drift_resyncs_everything_but_value() {
    let mut fixture = TestFixture::new();
    fixture
        .registry
        .add(
            "Message_MaxAllowedSize",
            json!(5000),
            max_size_options().meta_str("alert", "Deprecated"),
        )
        .unwrap();
    edit_value(&fixture, "Message_MaxAllowedSize", json!(1200));

    let mut fixture = fixture.restart(MapEnv::new());
    fixture
        .registry
        .add(
            "Message_MaxAllowedSize",
            json!(5000),
            max_size_options()
                .group("Limits")
                .section("Messages")
                .label("Max_Message_Size"),
        )
        .unwrap();

    let setting = fixture.model.setting("Message_MaxAllowedSize");
    assert_eq!(setting.value, json!(1200));
    assert_eq!(setting.group.as_deref(), Some("Limits"));
    assert_eq!(setting.section.as_deref(), Some("Messages"));
    assert_eq!(setting.i18n_label, "Max_Message_Size");
    assert_eq!(setting.get_meta("alert"), None);
    assert_eq!(fixture.model.upserts(), 1);
    assert_eq!(fixture.model.inserts(), 0);
}

#[test]
fn test_type_change_keeps_value() {
    let mut fixture = TestFixture::new();
    fixture
        .registry
        .add("Threshold", json!("10"), SettingOptions::new())
        .unwrap();

    let mut fixture = fixture.restart(MapEnv::new());
    fixture
        .registry
        .add(
            "Threshold",
            json!(10),
            SettingOptions::new().setting_type(SettingType::Int),
        )
        .unwrap();

    let setting = fixture.model.setting("Threshold");
    assert_eq!(setting.setting_type, SettingType::Int);
    assert_eq!(setting.value, json!("10"));
}

// =============================================================================
// Environment
// =============================================================================

#[test]
fn test_overwrite_replaces_stored_value() {
    let mut fixture = TestFixture::new();
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();
    edit_value(&fixture, "Message_MaxAllowedSize", json!(1200));

    let env = MapEnv::new().with("OVERWRITE_SETTING_Message_MaxAllowedSize", "8000");
    let mut fixture = fixture.restart(env);
    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();

    let setting = fixture.model.setting("Message_MaxAllowedSize");
    assert_eq!(setting.value, json!(8000));
    assert_eq!(setting.process_env_value, Some(json!(8000)));
    assert_eq!(setting.value_source, ValueSource::ProcessEnvValue);
    assert_eq!(fixture.model.upserts(), 1);
}

#[test]
fn test_overwrite_matching_stored_value_writes_nothing() {
    let env = MapEnv::new().with("OVERWRITE_SETTING_Site_Name", "Acme");
    let mut fixture = TestFixture::with_env(env.clone());
    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();
    assert_eq!(fixture.model.setting("Site_Name").value, json!("Acme"));

    let mut fixture = fixture.restart(env);
    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();

    assert_eq!(fixture.model.writes(), 0);
}

#[test]
fn test_unconvertible_overwrite_is_ignored() {
    let env = MapEnv::new().with("OVERWRITE_SETTING_Message_MaxAllowedSize", "lots");
    let mut fixture = TestFixture::with_env(env);

    fixture
        .registry
        .add("Message_MaxAllowedSize", json!(5000), max_size_options())
        .unwrap();

    assert_eq!(
        fixture.model.setting("Message_MaxAllowedSize").value,
        json!(5000)
    );
}

#[test]
fn test_default_override_only_seeds_first_insert() {
    let env = MapEnv::new().with("Site_Name", "Acme");
    let mut fixture = TestFixture::with_env(env.clone());
    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();

    let setting = fixture.model.setting("Site_Name");
    assert_eq!(setting.value, json!("Acme"));
    assert_eq!(setting.package_value, json!("Rocket"));

    edit_value(&fixture, "Site_Name", json!("Edited"));
    let mut fixture = fixture.restart(env);
    fixture
        .registry
        .add("Site_Name", json!("Rocket"), SettingOptions::new())
        .unwrap();

    assert_eq!(fixture.model.setting("Site_Name").value, json!("Edited"));
    assert_eq!(fixture.model.writes(), 0);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_enterprise_without_invalid_value_fails_before_writing() {
    let mut fixture = TestFixture::new();

    let err = fixture
        .registry
        .add(
            "LDAP_Enable",
            json!(false),
            SettingOptions::new()
                .setting_type(SettingType::Boolean)
                .group("LDAP")
                .enterprise(true),
        )
        .unwrap_err();

    assert!(matches!(err, Error::MissingInvalidValue(ref id) if id == "LDAP_Enable"));
    assert!(err.is_fatal());
    assert_eq!(fixture.model.writes(), 0);
}

#[test]
fn test_enterprise_with_invalid_value_is_stored() {
    let mut fixture = TestFixture::new();

    fixture
        .registry
        .add(
            "LDAP_Enable",
            json!(false),
            SettingOptions::new()
                .setting_type(SettingType::Boolean)
                .enterprise(true)
                .invalid_value(false)
                .modules(["ldap-enterprise"]),
        )
        .unwrap();

    let setting = fixture.model.setting("LDAP_Enable");
    assert!(setting.enterprise);
    assert_eq!(setting.invalid_value, Some(json!(false)));
    assert_eq!(setting.modules, Some(vec!["ldap-enterprise".to_string()]));
}

#[test]
fn test_missing_id_or_value_is_rejected() {
    let mut fixture = TestFixture::new();

    assert!(matches!(
        fixture.registry.add("", json!("x"), SettingOptions::new()),
        Err(Error::InvalidArguments { .. })
    ));
    assert!(matches!(
        fixture
            .registry
            .add("Site_Name", serde_json::Value::Null, SettingOptions::new()),
        Err(Error::InvalidArguments { .. })
    ));
    assert_eq!(fixture.model.writes(), 0);
}

// =============================================================================
// Operator Lists & Diagnostics
// =============================================================================

#[test]
fn test_operator_lists_flag_settings() {
    let config = RegistryConfig::builder()
        .blocked(["Site_Url"])
        .hidden(["Site_Url", "Log_Level"])
        .required_on_wizard(["Organization_Name"])
        .env_source(MapEnv::new())
        .build();
    let mut fixture = TestFixture::with_config(config);

    for id in ["Site_Url", "Log_Level", "Organization_Name"] {
        fixture
            .registry
            .add(id, json!(""), SettingOptions::new())
            .unwrap();
    }

    let site_url = fixture.model.setting("Site_Url");
    assert!(site_url.blocked && site_url.hidden);
    let log_level = fixture.model.setting("Log_Level");
    assert!(log_level.hidden && !log_level.blocked);
    assert!(fixture.model.setting("Organization_Name").required_on_wizard);
}

#[test]
fn test_invalid_value_in_development_mode_is_still_registered() {
    let config = RegistryConfig::builder()
        .development(true)
        .env_source(MapEnv::new())
        .build();
    let mut fixture = TestFixture::with_config(config);

    fixture
        .registry
        .add(
            "Message_MaxAllowedSize",
            json!("not a number"),
            max_size_options(),
        )
        .unwrap();

    assert_eq!(
        fixture.model.setting("Message_MaxAllowedSize").value,
        json!("not a number")
    );
}
