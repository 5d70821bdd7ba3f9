use std::time::Duration;

use ranktable_core::rank::{Limit, Order, Registry, ScoreFilter, TableConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CALL_TIMEOUT_ENV: &str = "RANKTABLE_CALL_TIMEOUT_MS";

fn config_from_env() -> TableConfig {
    let config = TableConfig::default();
    match std::env::var(CALL_TIMEOUT_ENV) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => config.with_call_timeout(Duration::from_millis(ms)),
            Err(_) => {
                warn!(value = %raw, "ignoring invalid {}", CALL_TIMEOUT_ENV);
                config
            }
        },
        Err(_) => config,
    }
}

fn main() -> ranktable_core::rank::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let registry: Registry<u64, String> = Registry::with_config(config_from_env());
    let board = registry.start("arcade")?;

    for (score, player) in [(3_200, "ada"), (1_750, "grace"), (4_100, "linus"), (2_900, "barbara")] {
        board.insert(score, player.to_string())?;
    }
    board.insert(4_500, "grace".to_string())?;

    for (rank, (score, player)) in board.select(Order::Descend, Limit::Count(3)).into_iter().enumerate() {
        info!(rank = rank + 1, %player, score, "top");
    }
    let above = board.select_where(&ScoreFilter::Gt(3_000), Order::Descend, Limit::Unbounded);
    info!(players = above.len(), size = board.size(), "players above 3000");

    registry.stop_all()
}
