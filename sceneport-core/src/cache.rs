//! Per-session memoization of node conversion results.

use crate::config::ConfigFingerprint;
use crate::document::GraphNode;
use crate::host::ObjectId;
use std::collections::HashMap;

/// Memoizes `(object, configuration)` → converted node within one export
/// session. A filtered-out result is cached too, as an explicit `None`.
///
/// Not thread-safe: a session is single-threaded and owns its cache
/// exclusively for its lifetime. Refusals caused by re-entering the
/// active traversal path are never stored here, since they depend on the
/// path rather than the object.
#[derive(Debug, Default)]
pub struct ConversionCache {
    entries: HashMap<(ObjectId, ConfigFingerprint), Option<GraphNode>>,
    computed: usize,
}

impl ConversionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached conversion for the key, or runs `compute`
    /// exactly once and stores its result, including the filtered-out
    /// sentinel.
    pub fn get_or_compute<F>(
        &mut self,
        object: ObjectId,
        config: ConfigFingerprint,
        compute: F,
    ) -> Option<GraphNode>
    where
        F: FnOnce(&mut ConversionCache) -> Option<GraphNode>,
    {
        if let Some(hit) = self.entries.get(&(object, config)) {
            return hit.clone();
        }
        let value = compute(self);
        self.computed += 1;
        self.entries.insert((object, config), value.clone());
        value
    }

    /// Number of distinct keys actually computed this session.
    pub fn computed_count(&self) -> usize {
        self.computed
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
    use crate::config::ExportConfig;
    use crate::host::{HostDocument, SceneObject};

    #[test]
    fn compute_runs_once_per_key() {
        let mut host = HostDocument::new();
        let id = host.add_object(SceneObject::new("cube"));
        let fingerprint = ExportConfig::default().fingerprint();

        let mut cache = ConversionCache::new();
        let first = cache.get_or_compute(id, fingerprint, |_| Some(GraphNode::named("cube")));
        let second = cache.get_or_compute(id, fingerprint, |_| {
            panic!("cached key must not recompute")
        });

        assert_eq!(first, second);
        assert_eq!(cache.computed_count(), 1);
    }

    #[test]
    fn filtered_out_sentinel_is_cached() {
        let mut host = HostDocument::new();
        let id = host.add_object(SceneObject::new("hidden"));
        let fingerprint = ExportConfig::default().fingerprint();

        let mut cache = ConversionCache::new();
        assert_eq!(cache.get_or_compute(id, fingerprint, |_| None), None);
        assert_eq!(
            cache.get_or_compute(id, fingerprint, |_| {
                panic!("absent result must be served from cache")
            }),
            None
        );
        assert_eq!(cache.computed_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_configs_are_distinct_keys() {
        let mut host = HostDocument::new();
        let id = host.add_object(SceneObject::new("cube"));
        let default_fingerprint = ExportConfig::default().fingerprint();
        let selected_fingerprint = ExportConfig {
            selected_only: true,
            ..ExportConfig::default()
        }
        .fingerprint();

        let mut cache = ConversionCache::new();
        cache.get_or_compute(id, default_fingerprint, |_| Some(GraphNode::named("a")));
        cache.get_or_compute(id, selected_fingerprint, |_| None);
        assert_eq!(cache.computed_count(), 2);
    }
}
