//! Sort-order bookkeeping
//!
//! Each scope (a group id, or `group_section`) counts the declarations made
//! into it. Counters start at -1 and are incremented before use, so the first
//! declaration of a scope gets 0. They are never reset or persisted.
//!
//! A setting id declared again in the same scope keeps the index it got the
//! first time.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SorterState {
    counters: HashMap<String, i64>,
    assigned: HashMap<(String, String), i64>,
}

impl SorterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope key of a declaration: `group_section`, `group`, or none without a group
    pub fn scope_key(group: Option<&str>, section: Option<&str>) -> Option<String> {
        match (group, section) {
            (Some(group), Some(section)) => Some(format!("{group}_{section}")),
            (Some(group), None) => Some(group.to_string()),
            (None, _) => None,
        }
    }

    /// Next sort index of `scope`
    pub fn next(&mut self, scope: &str) -> i64 {
        let counter = self.counters.entry(scope.to_string()).or_insert(-1);
        *counter += 1;
        *counter
    }

    /// Sort index of setting `id` in `scope`, stable across re-declarations
    pub fn index_of(&mut self, scope: &str, id: &str) -> i64 {
        let key = (scope.to_string(), id.to_string());
        if let Some(index) = self.assigned.get(&key) {
            return *index;
        }
        let index = self.next(scope);
        self.assigned.insert(key, index);
        index
    }

    /// Last index handed out in `scope`
    pub fn current(&self, scope: &str) -> Option<i64> {
        self.counters.get(scope).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key() {
        assert_eq!(
            SorterState::scope_key(Some("General"), Some("REST API")).as_deref(),
            Some("General_REST API")
        );
        assert_eq!(
            SorterState::scope_key(Some("General"), None).as_deref(),
            Some("General")
        );
        assert_eq!(SorterState::scope_key(None, Some("REST API")), None);
    }

    #[test]
    fn test_counters_start_at_zero_per_scope() {
        let mut sorters = SorterState::new();

        assert_eq!(sorters.next("General"), 0);
        assert_eq!(sorters.next("General"), 1);
        assert_eq!(sorters.next("General_Iframe"), 0);
        assert_eq!(sorters.next("General"), 2);
        assert_eq!(sorters.current("General"), Some(2));
        assert_eq!(sorters.current("Accounts"), None);
    }

    #[test]
    fn test_redeclared_id_keeps_its_index() {
        let mut sorters = SorterState::new();

        assert_eq!(sorters.index_of("General", "Site_Url"), 0);
        assert_eq!(sorters.index_of("General", "Site_Name"), 1);
        assert_eq!(sorters.index_of("General", "Site_Url"), 0);
        assert_eq!(sorters.index_of("General_Iframe", "Site_Url"), 0);
        assert_eq!(sorters.current("General"), Some(1));
    }
}
