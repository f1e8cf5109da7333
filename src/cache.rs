//! Incremental cache keyed by `(TypeModel, Strategy)`
//!
//! Emitted text is reused across passes while the structural key is unchanged.
//! Entries not requested during a pass are evicted when it ends, and a change
//! of emit options invalidates everything.

use crate::emit::EmitOptions;
use crate::model::{Strategy, TypeModel};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Structural identity of one generation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub model: TypeModel,
    pub strategy: Strategy,
}

impl CacheKey {
    pub fn new(model: TypeModel, strategy: Strategy) -> Self {
        Self { model, strategy }
    }
}

#[derive(Debug, Default)]
pub struct GenerationCache {
    entries: HashMap<CacheKey, Arc<str>>,
    touched: HashSet<CacheKey>,
    options: Option<EmitOptions>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pass; drops every entry when the emit options changed
    pub fn begin_pass(&mut self, options: &EmitOptions) {
        if self.options.as_ref() != Some(options) {
            if !self.entries.is_empty() {
                debug!(entries = self.entries.len(), "emit options changed, clearing cache");
            }
            self.entries.clear();
            self.options = Some(*options);
        }
        self.touched.clear();
    }

    /// Previously emitted text for `key`, marking it live for this pass
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<str>> {
        let hit = self.entries.get(key).cloned();
        if hit.is_some() {
            self.touched.insert(key.clone());
        }
        hit
    }

    pub fn insert(&mut self, key: CacheKey, text: Arc<str>) {
        self.touched.insert(key.clone());
        self.entries.insert(key, text);
    }

    /// Evict entries not used during the pass; returns how many were dropped
    pub fn end_pass(&mut self) -> usize {
        let before = self.entries.len();
        let touched = &self.touched;
        self.entries.retain(|key, _| touched.contains(key));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.entries.len(), "evicted stale cache entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Indentation;
    use crate::extract::extract;
    use crate::schema::Compilation;

    fn model(name: &str) -> TypeModel {
        let c = Compilation::from_yaml(&format!("types:\n  - {{ name: {} }}\n", name)).unwrap();
        extract(&c, name).unwrap()
    }

    #[test]
    fn test_hit_after_insert() {
        let mut cache = GenerationCache::new();
        let options = EmitOptions::default();
        cache.begin_pass(&options);
        let key = CacheKey::new(model("Note"), Strategy::Builder);
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), Arc::from("text"));
        assert_eq!(cache.end_pass(), 0);

        cache.begin_pass(&options);
        assert_eq!(cache.get(&key).as_deref(), Some("text"));
        // structurally equal key from a fresh extraction
        let again = CacheKey::new(model("Note"), Strategy::Builder);
        assert!(cache.get(&again).is_some());
        assert!(cache.get(&CacheKey::new(model("Note"), Strategy::Fluent)).is_none());
    }

    #[test]
    fn test_untouched_entries_are_evicted() {
        let mut cache = GenerationCache::new();
        let options = EmitOptions::default();
        cache.begin_pass(&options);
        cache.insert(CacheKey::new(model("A"), Strategy::Builder), Arc::from("a"));
        cache.insert(CacheKey::new(model("B"), Strategy::Builder), Arc::from("b"));
        cache.end_pass();

        cache.begin_pass(&options);
        assert!(cache.get(&CacheKey::new(model("A"), Strategy::Builder)).is_some());
        assert_eq!(cache.end_pass(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_option_change_clears() {
        let mut cache = GenerationCache::new();
        cache.begin_pass(&EmitOptions::default());
        cache.insert(CacheKey::new(model("A"), Strategy::Builder), Arc::from("a"));
        cache.end_pass();

        cache.begin_pass(&EmitOptions {
            indentation: Indentation::Tab,
            ..Default::default()
        });
        assert!(cache.is_empty());
    }
}
