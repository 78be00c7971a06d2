// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! LRU cache core.

use core::fmt::Debug;
use core::hash::Hash;
use std::collections::BTreeMap;

use futures::future::join_all;
use hashbrown::{HashMap, HashSet};
use log::{debug, warn};

use crate::AssetStore;

struct Entry<V> {
    value: V,
    /// Position in the recency order; larger is more recent.
    stamp: u64,
}

/// Summary of one [`AssetCache::add_batch`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Keys fetched and inserted.
    pub inserted: usize,
    /// Keys skipped because they were already cached.
    pub already_present: usize,
    /// Keys whose fetch failed; they are absent from the cache.
    pub failed: usize,
    /// Entries evicted to make room for the batch.
    pub evicted: usize,
    /// Fetched keys that did not fit even after eviction.
    ///
    /// This only happens when a batch holds more new keys than the cache can
    /// hold next to the batch keys it already contains.
    pub dropped: usize,
}

/// Bounded key → asset map with least-recently-used eviction.
///
/// Recency is defined by insertion and by [`AssetCache::get`]; iteration via
/// [`AssetCache::keys`] runs from least to most recently used.
pub struct AssetCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Entry<V>>,
    recency: BTreeMap<u64, K>,
    next_stamp: u64,
}

impl<K, V> Debug for AssetCache<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AssetCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> AssetCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is cached. Does not affect recency.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the asset for `key` and marks it most recently used.
    ///
    /// A miss returns `None` and leaves the cache untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        if let Some(key) = self.recency.remove(&entry.stamp) {
            self.recency.insert(stamp, key);
        }
        entry.stamp = stamp;
        Some(&entry.value)
    }

    /// Returns the asset for `key` without changing its recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Iterates cached keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.recency.values()
    }

    /// Iterates cached entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.recency
            .values()
            .filter_map(|key| self.entries.get(key).map(|entry| (key, &entry.value)))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Inserts an already available asset as most recently used.
    ///
    /// If the key is already cached its value is replaced. Otherwise the least
    /// recently used entries are evicted until there is room. Returns the
    /// number of evicted entries.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            let _ = self.get(&key);
            return 0;
        }
        if self.capacity == 0 {
            return 0;
        }
        let evicted = {
            let mut protected = HashSet::new();
            protected.insert(&key);
            self.evict_for(1, &protected)
        };
        self.push(key, value);
        evicted
    }

    /// Fetches every key of `keys` that is not cached yet and inserts it.
    ///
    /// Fetches for one batch run concurrently and are applied together once
    /// all of them settled. Keys already cached are neither refetched nor
    /// promoted, so repeating a batch is a no-op. A failed fetch is logged and
    /// does not affect the other keys of the batch.
    pub async fn add_batch<S>(&mut self, keys: &[K], store: &S) -> BatchReport
    where
        K: Debug,
        S: AssetStore<K, Asset = V> + ?Sized,
    {
        let mut report = BatchReport::default();
        let mut batch = HashSet::with_capacity(keys.len());
        let mut missing = Vec::new();
        for key in keys {
            if !batch.insert(key) {
                continue;
            }
            if self.entries.contains_key(key) {
                report.already_present += 1;
            } else {
                missing.push(key);
            }
        }
        if missing.is_empty() {
            return report;
        }

        let results = join_all(missing.iter().map(|key| store.fetch(key))).await;

        let mut fetched = Vec::with_capacity(results.len());
        for (key, result) in missing.into_iter().zip(results) {
            match result {
                Ok(asset) => fetched.push((key.clone(), asset)),
                Err(err) => {
                    warn!("failed to fetch asset {key:?}: {err}");
                    report.failed += 1;
                }
            }
        }

        report.evicted = self.evict_for(fetched.len(), &batch);
        let room = self.capacity.saturating_sub(self.entries.len());
        if fetched.len() > room {
            report.dropped = fetched.len() - room;
            warn!(
                "asset batch of {} new keys exceeds free capacity {room}; dropping {}",
                fetched.len(),
                report.dropped
            );
            fetched.truncate(room);
        }
        for (key, asset) in fetched {
            self.push(key, asset);
            report.inserted += 1;
        }
        report
    }

    fn push(&mut self, key: K, value: V) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.recency.insert(stamp, key.clone());
        self.entries.insert(key, Entry { value, stamp });
    }

    /// Evicts least recently used entries not in `protected` until `incoming`
    /// new entries fit, or nothing evictable is left.
    fn evict_for(&mut self, incoming: usize, protected: &HashSet<&K>) -> usize {
        let overflow = (self.entries.len() + incoming).saturating_sub(self.capacity);
        if overflow == 0 {
            return 0;
        }
        let victims: Vec<(u64, K)> = self
            .recency
            .iter()
            .filter(|(_, key)| !protected.contains(key))
            .take(overflow)
            .map(|(stamp, key)| (*stamp, key.clone()))
            .collect();
        for (stamp, key) in &victims {
            self.recency.remove(stamp);
            self.entries.remove(key);
        }
        debug!("evicted {} cached assets", victims.len());
        victims.len()
    }
}

#[cfg(test)]
mod tests {
    use super::AssetCache;

    #[test]
    fn insert_respects_capacity_and_order() {
        let mut cache = AssetCache::new(2);
        assert_eq!(cache.insert("a", 1), 0);
        assert_eq!(cache.insert("b", 2), 0);
        assert_eq!(cache.insert("c", 3), 1);

        assert!(!cache.contains(&"a"));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn reinsert_replaces_and_promotes() {
        let mut cache = AssetCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.insert("a", 10), 0);

        assert_eq!(cache.peek(&"a"), Some(&10));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = AssetCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);

        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut cache = AssetCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn iter_follows_recency() {
        let mut cache = AssetCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        let _ = cache.get(&"a");

        let order: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(order, [("b", 2), ("c", 3), ("a", 1)]);

        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.keys().count(), 0);
    }
}
