//! Error types for rank table operations.
//!
//! Absent keys and empty tables are not errors: lookups return `None`,
//! deletes return `false` and selects return an empty `Vec`.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for rank table operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The coordinator did not reply in time. The mutation may or may not
    /// have been applied.
    #[error("call to table '{table}' timed out after {waited:?}")]
    Timeout { table: String, waited: Duration },

    /// The coordinator thread has exited (table stopped or thread died).
    #[error("coordinator for table '{table}' is not running")]
    CoordinatorGone { table: String },

    #[error("table '{table}' is already started")]
    AlreadyStarted { table: String },

    #[error("table '{table}' has not been started")]
    TableNotStarted { table: String },

    #[error("failed to spawn coordinator for table '{table}'")]
    Spawn {
        table: String,
        #[source]
        source: std::io::Error,
    },

    /// The key index and score index disagree outside of a write.
    #[error("table '{table}' indexes disagree: {detail}")]
    Inconsistent { table: String, detail: String },
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Name of the table the error refers to.
    pub fn table(&self) -> &str {
        match self {
            Error::Timeout { table, .. }
            | Error::CoordinatorGone { table }
            | Error::AlreadyStarted { table }
            | Error::TableNotStarted { table }
            | Error::Spawn { table, .. }
            | Error::Inconsistent { table, .. } => table,
        }
    }
}
