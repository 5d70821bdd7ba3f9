/// Default bound on how long a write call waits for the coordinator's reply.
pub(crate) const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Prefix for coordinator thread names: `ranktable-<table>`.
pub(crate) const COORDINATOR_THREAD_PREFIX: &str = "ranktable";

/// Suffixes appended to a table name to label its two indexes.
pub(crate) const KEY_INDEX_SUFFIX: &str = "keys";
pub(crate) const SCORE_INDEX_SUFFIX: &str = "scores";
