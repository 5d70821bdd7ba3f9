//! Exact-match index from key to current score.
//!
//! Backed by a `DashMap` so lookups never wait on the writer for longer than
//! a shard lock. Only the coordinator mutates it.

use dashmap::DashMap;

use super::types::{RankKey, Score};

pub(crate) struct KeyIndex<K, S> {
    name: String,
    map: DashMap<K, S>,
}

impl<K: RankKey, S: Score> KeyIndex<K, S> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map: DashMap::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Current score for `key`, if it is live.
    pub(crate) fn get(&self, key: &K) -> Option<S> {
        self.map.get(key).map(|score| score.value().clone())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or overwrite. Returns the previous score.
    pub(crate) fn put(&self, key: K, score: S) -> Option<S> {
        self.map.insert(key, score)
    }

    /// Remove `key`, returning the score it held so the caller can locate
    /// the matching score index entry.
    pub(crate) fn remove(&self, key: &K) -> Option<S> {
        self.map.remove(key).map(|(_, score)| score)
    }

    pub(crate) fn clear(&self) {
        self.map.clear();
    }

    /// Number of live keys.
    pub(crate) fn count(&self) -> usize {
        self.map.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
