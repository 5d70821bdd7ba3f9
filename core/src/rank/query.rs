//! Read-side query logic.
//!
//! Queries read the two indexes directly and never involve the coordinator.
//! While an update is in flight they may see the key index and score index
//! disagree for that one key.

use super::coordinator::Indexes;
use super::types::{Limit, Order, Projected, Projection, RankKey, Record, Score, ScoreFilter};

/// Borrowed view over a table's indexes.
pub(crate) struct Query<'a, S, K> {
    indexes: &'a Indexes<S, K>,
}

impl<'a, S: Score, K: RankKey> Query<'a, S, K> {
    pub(crate) fn new(indexes: &'a Indexes<S, K>) -> Self {
        Self { indexes }
    }

    pub(crate) fn lookup(&self, key: &K) -> Option<S> {
        self.indexes.keys.get(key)
    }

    pub(crate) fn size(&self) -> usize {
        self.indexes.keys.count()
    }

    /// Records in `order`, at most `limit` of them. A limit of one reads only
    /// the extremum.
    pub(crate) fn select(&self, order: Order, limit: Limit) -> Vec<Record<S, K>> {
        if limit.is_single() {
            let extremum = match order {
                Order::Ascend => self.indexes.scores.first(),
                Order::Descend => self.indexes.scores.last(),
            };
            return extremum.into_iter().collect();
        }

        self.match_records(|score, key| Some((score.clone(), key.clone())), order, limit)
    }

    /// Apply `f` to records in `order`, keeping its `Some` outputs, and stop
    /// once `limit` outputs have been collected.
    pub(crate) fn match_records<T, F>(&self, f: F, order: Order, limit: Limit) -> Vec<T>
    where
        F: FnMut(&S, &K) -> Option<T>,
    {
        self.indexes.scores.scan(order, limit, f).collect()
    }

    pub(crate) fn match_spec(
        &self,
        filter: &ScoreFilter<S>,
        projection: Projection,
        order: Order,
        limit: Limit,
    ) -> Vec<Projected<S, K>> {
        self.match_records(
            |score, key| filter.matches(score).then(|| projection.apply(score, key)),
            order,
            limit,
        )
    }

    /// Cross-check the indexes. Only meaningful while no write is in flight.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let keys = self.indexes.keys.count();
        let scores = self.indexes.scores.len();
        if keys != scores {
            return Err(format!("{keys} keys but {scores} score entries"));
        }

        let orphans = self
            .indexes
            .scores
            .scan(Order::Ascend, Limit::Unbounded, |score, key| {
                (self.indexes.keys.get(key).as_ref() != Some(score)).then_some(())
            })
            .count();

        if orphans > 0 {
            return Err(format!("{orphans} score entry(s) without matching key entry"));
        }
        Ok(())
    }
}
