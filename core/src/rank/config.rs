//! Per-table configuration.

use std::time::Duration;

use crate::constants::DEFAULT_CALL_TIMEOUT_MS;

/// Configuration for a rank table.
#[derive(Clone, Debug)]
pub struct TableConfig {
    /// How long a write waits for the coordinator's reply before failing
    /// with a timeout. Overridable per call.
    pub call_timeout: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }
}

impl TableConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}
