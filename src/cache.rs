//! Container-lifetime cache of fully-initialized shared instances.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::descriptor::Instance;

/// Name-keyed store for shared component instances.
///
/// Writes are once-per-name: when two threads race to create the same shared
/// component for the first time, the first `store` wins and the loser's
/// redundant instance is discarded, so every caller ends up holding the same
/// instance. Entries are removed only by `clear` (container refresh/teardown).
#[derive(Default)]
pub(crate) struct InstanceCache {
    map: RwLock<HashMap<String, Instance>>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<Instance> {
        self.map.read().get(name).cloned()
    }

    /// Stores `instance` under `name` unless an entry already exists, and
    /// returns the winning instance either way.
    pub(crate) fn store(&self, name: &str, instance: Instance) -> Instance {
        let mut map = self.map.write();
        match map.get(name) {
            Some(existing) => existing.clone(),
            None => {
                map.insert(name.to_string(), instance.clone());
                instance
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.map.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_store_wins() {
        let cache = InstanceCache::new();
        let first: Instance = Arc::new(1u32);
        let second: Instance = Arc::new(2u32);

        let winner = cache.store("n", first.clone());
        assert!(Arc::ptr_eq(&winner, &first));

        let loser = cache.store("n", second);
        assert!(Arc::ptr_eq(&loser, &first));
        assert!(Arc::ptr_eq(&cache.get("n").unwrap(), &first));
    }

    #[test]
    fn clear_empties_all_entries() {
        let cache = InstanceCache::new();
        cache.store("n", Arc::new(1u32) as Instance);
        cache.clear();
        assert!(cache.get("n").is_none());
    }
}
