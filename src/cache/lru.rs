//! Least-recently-used cache with explicit recency order

use std::collections::{HashMap, VecDeque};

/// Bounded key-value cache with LRU eviction.
///
/// Re-accessing a key promotes it to most-recently-used; inserting at
/// capacity evicts the least-recently-used key first. Size never exceeds
/// the configured maximum.
#[derive(Debug)]
pub struct LruCache<V> {
    entries: HashMap<String, V>,
    /// Front is least recently used, back is most recently used
    recency: VecDeque<String>,
    max_size: usize,
}

impl<V> LruCache<V> {
    /// Create a cache holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    /// Look up a key, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.promote(key);
        }
        self.entries.get(key)
    }

    /// Insert a value, evicting the least-recently-used entry when full.
    pub fn insert(&mut self, key: String, value: V) {
        if self.entries.contains_key(&key) {
            self.promote(&key);
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.max_size {
            if let Some(oldest) = self.recency.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.recency.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Drop every entry and the recency order.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn promote(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }
}
