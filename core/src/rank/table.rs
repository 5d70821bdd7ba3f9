//! Rank table handle: the write path through the coordinator and the read
//! path straight against the indexes.

use std::sync::Arc;
use std::time::Duration;

use crate::constants::{KEY_INDEX_SUFFIX, SCORE_INDEX_SUFFIX};

use super::config::TableConfig;
use super::coordinator::{Coordinator, Indexes};
use super::error::{Error, Result};
use super::query::Query;
use super::types::{Limit, Order, Projected, Projection, RankKey, Record, Score, ScoreFilter};

struct Inner<S, K> {
    name: String,
    config: TableConfig,
    indexes: Arc<Indexes<S, K>>,
    coordinator: Coordinator<S, K>,
}

/// A ranked key/score table.
///
/// Cloning is cheap and every clone talks to the same coordinator. Writes
/// are serialized by the coordinator; reads run concurrently with each other
/// and with writes, and are eventually consistent across the two indexes
/// while an update is being applied.
pub struct RankTable<S, K> {
    inner: Arc<Inner<S, K>>,
}

impl<S, K> Clone for RankTable<S, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, K> std::fmt::Debug for RankTable<S, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankTable")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl<S: Score, K: RankKey> RankTable<S, K> {
    /// Create an empty table and start its coordinator.
    ///
    /// This does not register the name anywhere; use
    /// [`Registry::start`](super::Registry::start) for name-routed tables.
    pub fn start(name: &str, config: TableConfig) -> Result<Self> {
        let indexes = Arc::new(Indexes::new(
            format!("{}.{}", name, KEY_INDEX_SUFFIX),
            format!("{}.{}", name, SCORE_INDEX_SUFFIX),
        ));
        let coordinator = Coordinator::spawn(name, Arc::clone(&indexes))?;

        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                config,
                indexes,
                coordinator,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &TableConfig {
        &self.inner.config
    }

    /// Names of the key index and the score index.
    pub fn index_names(&self) -> (&str, &str) {
        (self.inner.indexes.keys.name(), self.inner.indexes.scores.name())
    }

    /// Set `key`'s score, replacing any previous one.
    pub fn insert(&self, score: S, key: K) -> Result<()> {
        self.insert_timeout(score, key, self.inner.config.call_timeout)
    }

    pub fn insert_timeout(&self, score: S, key: K, timeout: Duration) -> Result<()> {
        self.inner.coordinator.insert(score, key, timeout)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn delete(&self, key: K) -> Result<bool> {
        self.delete_timeout(key, self.inner.config.call_timeout)
    }

    pub fn delete_timeout(&self, key: K, timeout: Duration) -> Result<bool> {
        self.inner.coordinator.delete(key, timeout)
    }

    /// Remove every record.
    pub fn delete_all(&self) -> Result<()> {
        self.delete_all_timeout(self.inner.config.call_timeout)
    }

    pub fn delete_all_timeout(&self, timeout: Duration) -> Result<()> {
        self.inner.coordinator.clear(timeout)
    }

    /// Stop the coordinator and drop the table's contents. Writes through
    /// any clone of this handle fail with [`Error::CoordinatorGone`]
    /// afterwards.
    pub fn stop(&self) -> Result<()> {
        self.inner.coordinator.stop(self.inner.config.call_timeout)
    }

    pub fn is_running(&self) -> bool {
        self.inner.coordinator.is_running()
    }

    /// Whether both handles refer to the same started table.
    pub(crate) fn same_table(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn lookup(&self, key: &K) -> Option<S> {
        self.query().lookup(key)
    }

    pub fn size(&self) -> usize {
        self.query().size()
    }

    /// Records ordered by `(score, key)` in `order`, truncated to `limit`.
    pub fn select(&self, order: Order, limit: Limit) -> Vec<Record<S, K>> {
        self.query().select(order, limit)
    }

    /// Filter and project records in `order`. `f` returns `None` to skip a
    /// record; the scan stops as soon as `limit` results are collected.
    ///
    /// ```ignore
    /// // keys with score above 10, highest first
    /// table.match_records(|s, k| (*s > 10).then(|| k.clone()), Order::Descend, Limit::Unbounded);
    /// ```
    pub fn match_records<T, F>(&self, f: F, order: Order, limit: Limit) -> Vec<T>
    where
        F: FnMut(&S, &K) -> Option<T>,
    {
        self.query().match_records(f, order, limit)
    }

    /// Declarative form of [`match_records`](Self::match_records).
    pub fn match_spec(
        &self,
        filter: &ScoreFilter<S>,
        projection: Projection,
        order: Order,
        limit: Limit,
    ) -> Vec<Projected<S, K>> {
        self.query().match_spec(filter, projection, order, limit)
    }

    /// Records whose score passes `filter`.
    pub fn select_where(&self, filter: &ScoreFilter<S>, order: Order, limit: Limit) -> Vec<Record<S, K>> {
        self.match_records(
            |score, key| filter.matches(score).then(|| (score.clone(), key.clone())),
            order,
            limit,
        )
    }

    /// Verify that the key index and score index agree. Only meaningful
    /// when no write is in flight.
    pub fn check_consistency(&self) -> Result<()> {
        self.query().check_consistency().map_err(|detail| Error::Inconsistent {
            table: self.inner.name.clone(),
            detail,
        })
    }

    fn query(&self) -> Query<'_, S, K> {
        Query::new(&self.inner.indexes)
    }

    #[cfg(test)]
    pub(crate) fn stall(&self, duration: Duration, timeout: Duration) -> Result<()> {
        self.inner.coordinator.stall(duration, timeout)
    }
}
