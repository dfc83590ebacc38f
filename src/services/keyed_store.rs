//! Fixed-capacity associative store ordered by recency of use.
//!
//! Every entry carries a monotonically increasing rank; a `BTreeMap` from
//! rank to key keeps the entries in strict recency order so the least
//! recently used key is always the first entry of the index. Ranks are
//! never reused, so two entries can never tie.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::domain::models::Capacity;

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    rank: u64,
}

/// LRU-ordered key/value store with no concurrency awareness.
#[derive(Debug, Clone)]
pub struct KeyedStore<K, V> {
    entries: HashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    next_rank: u64,
    capacity: Capacity,
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: Capacity) -> Self {
        let entries = match capacity.limit() {
            Some(limit) => HashMap::with_capacity(limit.min(1024)),
            None => HashMap::new(),
        };
        Self {
            entries,
            recency: BTreeMap::new(),
            next_rank: 0,
            capacity,
        }
    }

    /// Look up `key` and mark it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let rank = self.bump_rank();
        let slot = self.entries.get_mut(key)?;
        let previous = std::mem::replace(&mut slot.rank, rank);
        if let Some(k) = self.recency.remove(&previous) {
            self.recency.insert(rank, k);
        }
        Some(&slot.value)
    }

    /// Look up `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite `key`, marking it most recently used.
    ///
    /// When a new key would push the store past its capacity, the least
    /// recently used entry is evicted first and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let rank = self.bump_rank();

        if let Some(slot) = self.entries.get_mut(&key) {
            let previous = std::mem::replace(&mut slot.rank, rank);
            slot.value = value;
            self.recency.remove(&previous);
            self.recency.insert(rank, key);
            return None;
        }

        let evicted = if self.capacity.is_full(self.entries.len()) {
            self.pop_lru()
        } else {
            None
        };

        self.recency.insert(rank, key.clone());
        self.entries.insert(key, Slot { value, rank });
        evicted
    }

    /// Drop `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.recency.remove(&slot.rank);
        Some(slot.value)
    }

    /// Evict the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (_, key) = self.recency.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.recency.values()
    }

    fn bump_rank(&mut self) -> u64 {
        let rank = self.next_rank;
        self.next_rank += 1;
        rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(limit: usize) -> KeyedStore<u32, &'static str> {
        KeyedStore::new(Capacity::bounded(limit).unwrap())
    }

    #[test]
    fn test_get_missing_key() {
        let mut s = store(2);
        assert_eq!(s.get(&1), None);
        assert!(s.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let mut s = store(2);
        assert_eq!(s.put(1, "one"), None);
        assert_eq!(s.get(&1), Some(&"one"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_inserted() {
        let mut s = store(2);
        s.put(1, "one");
        s.put(2, "two");
        assert_eq!(s.put(3, "three"), Some((1, "one")));
        assert!(!s.contains(&1));
        assert!(s.contains(&2));
        assert!(s.contains(&3));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut s = store(2);
        s.put(1, "one");
        s.put(2, "two");
        s.get(&1);
        assert_eq!(s.put(3, "three"), Some((2, "two")));
        assert!(s.contains(&1));
    }

    #[test]
    fn test_peek_does_not_refresh_recency() {
        let mut s = store(2);
        s.put(1, "one");
        s.put(2, "two");
        assert_eq!(s.peek(&1), Some(&"one"));
        assert_eq!(s.put(3, "three"), Some((1, "one")));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut s = store(2);
        s.put(1, "one");
        s.put(2, "two");
        assert_eq!(s.put(1, "uno"), None);
        assert_eq!(s.len(), 2);
        assert_eq!(s.peek(&1), Some(&"uno"));
        // Overwrite made 1 most recent, so 2 goes next.
        assert_eq!(s.put(3, "three"), Some((2, "two")));
    }

    #[test]
    fn test_remove() {
        let mut s = store(2);
        s.put(1, "one");
        assert_eq!(s.remove(&1), Some("one"));
        assert_eq!(s.remove(&1), None);
        assert_eq!(s.keys_by_recency().count(), 0);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut s: KeyedStore<u32, u32> = KeyedStore::new(Capacity::Unbounded);
        for i in 0..1000 {
            assert_eq!(s.put(i, i), None);
        }
        assert_eq!(s.len(), 1000);
    }

    #[test]
    fn test_keys_by_recency_order() {
        let mut s = store(3);
        s.put(1, "one");
        s.put(2, "two");
        s.put(3, "three");
        s.get(&1);
        let order: Vec<u32> = s.keys_by_recency().copied().collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut s: KeyedStore<String, u32> = KeyedStore::new(Capacity::bounded(1).unwrap());
        s.put("alpha".to_string(), 1);
        assert_eq!(s.get("alpha"), Some(&1));
        assert!(s.contains("alpha"));
    }

    #[test]
    fn test_clear() {
        let mut s = store(2);
        s.put(1, "one");
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.pop_lru(), None);
    }
}
