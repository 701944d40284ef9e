//! In-memory caching for search results and DOI checks.
//!
//! [`FifoCache`] is a bounded map that evicts the oldest-inserted entry when
//! full. Reads do not refresh an entry's position, so this is insertion-order
//! eviction rather than LRU. Entries live for the lifetime of the process.
//!
//! The cache is safe to share between tasks. The lock is held only for the
//! lookup or the insert itself, so two tasks missing on the same key may both
//! compute the value; the later insert simply overwrites the earlier one.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Default capacity of the search-result cache
pub const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 256;

/// Default capacity of the DOI-validity cache
pub const DEFAULT_DOI_CACHE_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Entries<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

/// Bounded key-value store with first-in, first-out eviction
#[derive(Debug)]
pub struct FifoCache<K, V> {
    capacity: usize,
    entries: Mutex<Entries<K, V>>,
}

impl<K, V> FifoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries; zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries<K, V>> {
        // A panic while holding the lock cannot leave the map half-updated in a
        // way that matters for a cache, so recover the guard.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a cached value
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().map.get(key).cloned()
    }

    /// Check whether a key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.lock().map.contains_key(key)
    }

    /// Insert a value, evicting the oldest-inserted entry when full.
    ///
    /// Re-inserting an existing key replaces its value but keeps its original
    /// position in the eviction order.
    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.lock();
        if let Some(existing) = entries.map.get_mut(&key) {
            *existing = value;
            return;
        }

        while entries.map.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }

        entries.order.push_back(key.clone());
        entries.map.insert(key, value);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.map.clear();
        entries.order.clear();
        tracing::debug!("Cache cleared");
    }
}
