//! Property tests for `KeyedStore`
//!
//! Random operation sequences are replayed against the store and against a
//! plain recency-ordered `Vec` model; the two must agree after every step.

use coalesce_cache::{Capacity, KeyedStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Get(u8),
    Peek(u8),
    Put(u8, u32),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space forces plenty of overwrites and evictions.
    prop_oneof![
        (0u8..8).prop_map(Op::Get),
        (0u8..8).prop_map(Op::Peek),
        ((0u8..8), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..8).prop_map(Op::Remove),
    ]
}

/// Reference model: least recently used first.
#[derive(Default)]
struct Model {
    entries: Vec<(u8, u32)>,
    limit: usize,
}

impl Model {
    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        let entry = self.entries.remove(idx);
        self.entries.push(entry);
        Some(entry.1)
    }

    fn peek(&self, key: u8) -> Option<u32> {
        self.position(key).map(|idx| self.entries[idx].1)
    }

    fn put(&mut self, key: u8, value: u32) -> Option<(u8, u32)> {
        if let Some(idx) = self.position(key) {
            self.entries.remove(idx);
            self.entries.push((key, value));
            return None;
        }
        let evicted = (self.entries.len() >= self.limit).then(|| self.entries.remove(0));
        self.entries.push((key, value));
        evicted
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }
}

proptest! {
    /// Property: the store never holds more entries than its capacity
    #[test]
    fn prop_len_never_exceeds_capacity(
        limit in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut store = KeyedStore::new(Capacity::bounded(limit).unwrap());

        for op in ops {
            if let Op::Put(k, v) = op {
                store.put(k, v);
            } else if let Op::Get(k) = op {
                store.get(&k);
            }
            prop_assert!(store.len() <= limit);
        }
    }

    /// Property: the store behaves exactly like a recency-ordered list
    #[test]
    fn prop_matches_lru_model(
        limit in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut store = KeyedStore::new(Capacity::bounded(limit).unwrap());
        let mut model = Model { entries: Vec::new(), limit };

        for op in ops {
            match op {
                Op::Get(k) => prop_assert_eq!(store.get(&k).copied(), model.get(k)),
                Op::Peek(k) => prop_assert_eq!(store.peek(&k).copied(), model.peek(k)),
                Op::Put(k, v) => prop_assert_eq!(store.put(k, v), model.put(k, v)),
                Op::Remove(k) => prop_assert_eq!(store.remove(&k), model.remove(k)),
            }

            let order: Vec<u8> = store.keys_by_recency().copied().collect();
            let expected: Vec<u8> = model.entries.iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(order, expected);
        }
    }

    /// Property: an unbounded store never evicts
    #[test]
    fn prop_unbounded_never_evicts(keys in prop::collection::hash_set(any::<u16>(), 0..300)) {
        let mut store = KeyedStore::new(Capacity::Unbounded);

        for &k in &keys {
            prop_assert!(store.put(k, ()).is_none());
        }
        prop_assert_eq!(store.len(), keys.len());
    }
}

#[test]
fn test_pop_lru_drains_in_recency_order() {
    let mut store = KeyedStore::new(Capacity::bounded(4).unwrap());
    for k in ["a", "b", "c"] {
        store.put(k, k.len());
    }
    store.get("a");

    let drained: Vec<&str> = std::iter::from_fn(|| store.pop_lru().map(|(k, _)| k)).collect();
    assert_eq!(drained, vec!["b", "c", "a"]);
    assert!(store.is_empty());
}
