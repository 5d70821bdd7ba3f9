// Public API
pub mod rank;

// Internal modules
pub(crate) mod constants;

pub use rank::{Error, Limit, Order, RankTable, Registry, Result, TableConfig};
