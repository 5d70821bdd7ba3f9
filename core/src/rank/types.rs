//! Core types for rank tables.

use std::hash::Hash;

/// Bound for score types. Any totally ordered value that can be shared
/// across the coordinator thread and readers.
pub trait Score: Ord + Clone + Send + Sync + 'static {}

impl<T> Score for T where T: Ord + Clone + Send + Sync + 'static {}

/// Bound for key types. Keys are hashed by the key index and ordered as the
/// tiebreaker between equal scores in the score index.
pub trait RankKey: Ord + Hash + Clone + Send + Sync + 'static {}

impl<T> RankKey for T where T: Ord + Hash + Clone + Send + Sync + 'static {}

/// A `(score, key)` pair as stored in the score index.
pub type Record<S, K> = (S, K);

/// Traversal direction over the score index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Lowest `(score, key)` first.
    Ascend,
    /// Highest `(score, key)` first.
    Descend,
}

/// Maximum number of results a query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    Unbounded,
    /// At most this many results. `Count(0)` yields nothing.
    Count(usize),
}

impl Limit {
    /// Upper bound usable with `Iterator::take`.
    pub fn as_take(self) -> usize {
        match self {
            Limit::Unbounded => usize::MAX,
            Limit::Count(n) => n,
        }
    }

    pub fn is_single(self) -> bool {
        self == Limit::Count(1)
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Limit::Count(n)
    }
}

impl From<Option<usize>> for Limit {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Limit::Unbounded, Limit::Count)
    }
}

/// Declarative predicate over scores, for callers that don't want to write
/// a closure. Bounds of `Between` are inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreFilter<S> {
    Any,
    Gt(S),
    Ge(S),
    Lt(S),
    Le(S),
    Eq(S),
    Between(S, S),
}

impl<S: Ord> ScoreFilter<S> {
    pub fn matches(&self, score: &S) -> bool {
        match self {
            ScoreFilter::Any => true,
            ScoreFilter::Gt(bound) => score > bound,
            ScoreFilter::Ge(bound) => score >= bound,
            ScoreFilter::Lt(bound) => score < bound,
            ScoreFilter::Le(bound) => score <= bound,
            ScoreFilter::Eq(bound) => score == bound,
            ScoreFilter::Between(low, high) => score >= low && score <= high,
        }
    }
}

/// Which part of a matching record a declarative match returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Record,
    Key,
    Score,
}

/// Output of a declarative match, shaped by its `Projection`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Projected<S, K> {
    Record(S, K),
    Key(K),
    Score(S),
}

impl Projection {
    pub fn apply<S: Clone, K: Clone>(self, score: &S, key: &K) -> Projected<S, K> {
        match self {
            Projection::Record => Projected::Record(score.clone(), key.clone()),
            Projection::Key => Projected::Key(key.clone()),
            Projection::Score => Projected::Score(score.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_conversions() {
        assert_eq!(Limit::from(3), Limit::Count(3));
        assert_eq!(Limit::from(None), Limit::Unbounded);
        assert_eq!(Limit::from(Some(7)), Limit::Count(7));
        assert_eq!(Limit::Unbounded.as_take(), usize::MAX);
        assert!(Limit::Count(1).is_single());
        assert!(!Limit::Unbounded.is_single());
    }

    #[test]
    fn test_score_filter() {
        assert!(ScoreFilter::Gt(10).matches(&11));
        assert!(!ScoreFilter::Gt(10).matches(&10));
        assert!(ScoreFilter::Ge(10).matches(&10));
        assert!(ScoreFilter::Lt(10).matches(&9));
        assert!(ScoreFilter::Le(10).matches(&10));
        assert!(ScoreFilter::Eq(10).matches(&10));
        assert!(ScoreFilter::Between(5, 10).matches(&5));
        assert!(ScoreFilter::Between(5, 10).matches(&10));
        assert!(!ScoreFilter::Between(5, 10).matches(&11));
        assert!(ScoreFilter::<i32>::Any.matches(&i32::MIN));
    }

    #[test]
    fn test_projection() {
        let (score, key) = (42u64, "alice".to_string());
        assert_eq!(
            Projection::Record.apply(&score, &key),
            Projected::Record(42, "alice".to_string())
        );
        assert_eq!(Projection::Key.apply(&score, &key), Projected::Key("alice".to_string()));
        assert_eq!(Projection::Score.apply(&score, &key), Projected::Score(42));
    }
}
