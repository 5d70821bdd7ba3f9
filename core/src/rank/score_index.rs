//! Ordered index of `(score, key)` pairs.
//!
//! The pair, not the bare score, is the element of the sorted set: scores may
//! repeat, and ordering by key within equal scores keeps the order total.
//! Backed by a lock-free skip list so readers traverse while the coordinator
//! inserts and removes.

use crossbeam_skiplist::SkipSet;

use super::types::{Limit, Order, RankKey, Record, Score};

pub(crate) struct ScoreIndex<S, K> {
    name: String,
    set: SkipSet<Record<S, K>>,
}

impl<S: Score, K: RankKey> ScoreIndex<S, K> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set: SkipSet::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Add `(score, key)`. Returns false if the pair was already present.
    pub(crate) fn insert(&self, score: S, key: K) -> bool {
        let record = (score, key);
        if self.set.contains(&record) {
            return false;
        }
        self.set.insert(record);
        true
    }

    /// Remove exactly `(score, key)`. Absence is not an error.
    pub(crate) fn remove(&self, score: &S, key: &K) -> bool {
        // SkipSet lookups borrow the whole element, so the pair is rebuilt.
        let record = (score.clone(), key.clone());
        self.set.remove(&record).is_some()
    }

    pub(crate) fn clear(&self) {
        self.set.clear();
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, score: &S, key: &K) -> bool {
        self.set.contains(&(score.clone(), key.clone()))
    }

    /// Smallest pair.
    pub(crate) fn first(&self) -> Option<Record<S, K>> {
        self.set.front().map(|entry| entry.value().clone())
    }

    /// Largest pair.
    pub(crate) fn last(&self) -> Option<Record<S, K>> {
        self.set.back().map(|entry| entry.value().clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.set.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Lazily walk the index in `order`, passing each pair to `f` and
    /// yielding its `Some` results until `limit` of them have been produced.
    ///
    /// Nothing beyond the last accepted element is visited, so small limits
    /// over large tables stay cheap. Entries inserted or removed by the
    /// writer during the walk may or may not be observed.
    pub(crate) fn scan<'a, T, F>(&'a self, order: Order, limit: Limit, mut f: F) -> impl Iterator<Item = T> + 'a
    where
        F: FnMut(&S, &K) -> Option<T> + 'a,
        T: 'a,
    {
        let entries: Box<dyn Iterator<Item = crossbeam_skiplist::set::Entry<'a, Record<S, K>>> + 'a> =
            match order {
                Order::Ascend => Box::new(self.set.iter()),
                Order::Descend => Box::new(self.set.iter().rev()),
            };

        entries
            .filter_map(move |entry| {
                let (score, key) = entry.value();
                f(score, key)
            })
            .take(limit.as_take())
    }
}
