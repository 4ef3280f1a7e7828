//! Structural comparison of stored and declared settings

use crate::config::{Document, Setting};
use crate::error::Result;
use crate::storage::SettingUpdate;
use serde_json::{Map, Value};

/// Fields that do not count as drift: value, provenance and timestamps
pub const IGNORED_KEYS: [&str; 7] = [
    "value",
    "ts",
    "createdAt",
    "valueSource",
    "packageValue",
    "processEnvValue",
    "_updatedAt",
];

fn to_map(setting: &Setting) -> Result<Map<String, Value>> {
    Document::Setting(setting.clone()).to_map()
}

/// Whether two raw documents agree on every key outside `ignored`
///
/// A key present on one side only counts as a difference.
fn equal_ignoring(a: &Map<String, Value>, b: &Map<String, Value>, ignored: &[&str]) -> bool {
    a.keys()
        .chain(b.keys())
        .filter(|key| !ignored.contains(&key.as_str()))
        .all(|key| a.get(key) == b.get(key))
}

/// Whether `stored` differs from `declared` in type, grouping, labels, flags
/// or display metadata
///
/// # Errors
///
/// Returns an error if either setting cannot be serialized.
pub fn has_structural_drift(stored: &Setting, declared: &Setting) -> Result<bool> {
    Ok(!equal_ignoring(
        &to_map(stored)?,
        &to_map(declared)?,
        &IGNORED_KEYS,
    ))
}

/// Update re-syncing a stored setting to its declaration while keeping its value
///
/// Every declared field except `value` is set; keys only the stored document
/// has are removed, `_updatedAt` excepted.
///
/// # Errors
///
/// Returns an error if either setting cannot be serialized.
pub fn drift_update(stored: &Setting, declared: &Setting) -> Result<SettingUpdate> {
    let stored = to_map(stored)?;
    let mut update = SettingUpdate::set_all(to_map(declared)?);
    update.set.remove("value");
    update.unset = stored
        .keys()
        .filter(|key| !matches!(key.as_str(), "_id" | "_updatedAt" | "value"))
        .filter(|key| !update.set.contains_key(key.as_str()))
        .cloned()
        .collect();
    Ok(update)
}
