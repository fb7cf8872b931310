//! Bounded caches for child property generation
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{Property, PropertyGenerator};
use crate::types::Type;
use indexmap::IndexMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of entries kept by a `PropertyCache`
pub const DEFAULT_PROPERTY_CACHE_SIZE: usize = 2048;

/// Least-recently-used cache safe for concurrent compute-if-absent
///
/// Values are computed outside the lock; when two threads race on the same
/// key the first inserted value is kept.
#[derive(Debug)]
pub struct PropertyCache<K, V> {
    capacity: usize,
    entries: Mutex<IndexMap<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> PropertyCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<K, V>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        let value = entries.shift_remove(key)?;
        entries.insert(key.clone(), value.clone());
        Some(value)
    }

    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let computed = compute();

        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        entries.insert(key, computed.clone());
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
        computed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Memoizes a delegate generator per property type
pub struct LazyPropertyGenerator {
    delegate: Arc<dyn PropertyGenerator>,
    cache: PropertyCache<Type, Vec<Property>>,
}

impl LazyPropertyGenerator {
    pub fn new(delegate: Arc<dyn PropertyGenerator>, capacity: usize) -> Self {
        Self {
            delegate,
            cache: PropertyCache::new(capacity),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl PropertyGenerator for LazyPropertyGenerator {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
        self.cache.get_or_insert_with(property.ty.clone(), || {
            self.delegate.generate_child_properties(property)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::FieldPropertyGenerator;
    use crate::types::StructDef;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl PropertyGenerator for CountingGenerator {
        fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            FieldPropertyGenerator::new().generate_child_properties(property)
        }
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let cache = PropertyCache::new(2);
        cache.get_or_insert_with("a", || 1);
        cache.get_or_insert_with("b", || 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.get_or_insert_with("c", || 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lazy_generator_memoizes_and_clears() {
        let counting = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let lazy = LazyPropertyGenerator::new(counting.clone(), 16);
        let property = Property::root(Type::of_struct(StructDef::new("Item").field("id", Type::String)));

        assert_eq!(lazy.generate_child_properties(&property).len(), 1);
        assert_eq!(lazy.generate_child_properties(&property).len(), 1);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

        lazy.clear();
        assert_eq!(lazy.cached_len(), 0);
        lazy.generate_child_properties(&property);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_is_shared_across_threads() {
        let cache = Arc::new(PropertyCache::new(64));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..32usize {
                        assert_eq!(cache.get_or_insert_with(i, || i * 10), i * 10);
                    }
                    t
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 32);
    }
}
