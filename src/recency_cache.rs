use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// A small least-recently-used map.
///
/// Entries are kept in recency order (front is the least recently used). Capacities
/// are expected to be tiny (a handful of studies), so lookups are linear.
pub struct RecencyCache<K, V> {
    entries: VecDeque<(K, V)>,
    capacity: NonZeroUsize,
}

impl<K: PartialEq + std::fmt::Debug, V> RecencyCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.get() + 1),
            capacity,
        }
    }

    /// Look up `key`, marking it as the most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let i = self.position(key)?;
        let entry = self.entries.remove(i)?;
        self.entries.push_back(entry);
        self.entries.back().map(|(_, v)| v)
    }

    /// Insert or replace `key`, marking it as the most recently used. Evicts the least
    /// recently used entry when over capacity.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(i) = self.position(&key) {
            self.entries.remove(i);
        }
        self.entries.push_back((key, value));
        if self.entries.len() > self.capacity.get() {
            if let Some((evicted, _)) = self.entries.pop_front() {
                tracing::debug!(key = format!("{evicted:?}"), "evicted from cache");
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}
