//! Ranked key/score tables.
//!
//! Architecture:
//! - KeyIndex: concurrent hash map from key to current score
//! - ScoreIndex: lock-free ordered set of (score, key) pairs
//! - Coordinator: the single writer thread that keeps both indexes in step
//! - Query: read-only select/match/lookup straight against the indexes
//! - Registry: starts tables and resolves them by name
//!
//! The indexes are only reachable through a table:
//!
//! ```compile_fail
//! use ranktable_core::rank::ScoreIndex;
//! ```
//!
//! ```compile_fail
//! use ranktable_core::rank::KeyIndex;
//! ```

mod config;
mod coordinator;
mod error;
mod key_index;
mod query;
mod registry;
mod score_index;
mod table;
mod types;

pub use config::TableConfig;
pub use error::{Error, Result};
pub use registry::Registry;
pub use table::RankTable;
pub use types::{Limit, Order, Projected, Projection, RankKey, Record, Score, ScoreFilter};
