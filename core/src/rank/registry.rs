//! Name-routed access to rank tables.
//!
//! Coordinator handles are kept here, outside the tables themselves, so a
//! table's size is exactly its number of live records.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use super::config::TableConfig;
use super::error::{Error, Result};
use super::table::RankTable;
use super::types::{Limit, Order, RankKey, Record, Score};

pub struct Registry<S, K> {
    tables: DashMap<String, RankTable<S, K>>,
    config: TableConfig,
}

impl<S: Score, K: RankKey> Registry<S, K> {
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Tables started through this registry use `config` unless started
    /// with [`start_with_config`](Self::start_with_config).
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            tables: DashMap::new(),
            config,
        }
    }

    pub fn start(&self, name: &str) -> Result<RankTable<S, K>> {
        self.start_with_config(name, self.config.clone())
    }

    /// Start a table under `name`. Fails if a running table already holds
    /// the name; a table stopped through its own handle is replaced.
    pub fn start_with_config(&self, name: &str, config: TableConfig) -> Result<RankTable<S, K>> {
        match self.tables.entry(name.to_string()) {
            Entry::Occupied(occupied) if occupied.get().is_running() => Err(Error::AlreadyStarted {
                table: name.to_string(),
            }),
            Entry::Occupied(mut occupied) => {
                let table = RankTable::start(name, config)?;
                occupied.insert(table.clone());
                info!(table = name, "stopped table replaced");
                Ok(table)
            }
            Entry::Vacant(vacant) => {
                let table = RankTable::start(name, config)?;
                vacant.insert(table.clone());
                info!(table = name, "table registered");
                Ok(table)
            }
        }
    }

    /// Resolve a running table by name. A table stopped through its own
    /// handle counts as not started and is dropped from the registry.
    pub fn table(&self, name: &str) -> Result<RankTable<S, K>> {
        let table = self
            .tables
            .get(name)
            .map(|table| table.value().clone())
            .ok_or_else(|| Error::TableNotStarted {
                table: name.to_string(),
            })?;

        if !table.is_running() {
            self.tables.remove_if(name, |_, registered| registered.same_table(&table));
            return Err(Error::TableNotStarted {
                table: name.to_string(),
            });
        }
        Ok(table)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_ok()
    }

    /// Running table names, sorted.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .iter()
            .filter(|entry| entry.value().is_running())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Stop `name`'s coordinator and unregister it. If the stop fails the
    /// table stays registered, so the name is not reused while its
    /// coordinator may still be running.
    pub fn stop(&self, name: &str) -> Result<()> {
        let table = self.table(name)?;
        table.stop()?;
        self.tables.remove_if(name, |_, registered| registered.same_table(&table));
        Ok(())
    }

    /// Stop every registered table.
    pub fn stop_all(&self) -> Result<()> {
        for name in self.tables() {
            match self.stop(&name) {
                // Raced with a concurrent stop of the same name.
                Ok(()) | Err(Error::TableNotStarted { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn insert(&self, name: &str, score: S, key: K) -> Result<()> {
        self.table(name)?.insert(score, key)
    }

    pub fn delete(&self, name: &str, key: K) -> Result<bool> {
        self.table(name)?.delete(key)
    }

    pub fn delete_all(&self, name: &str) -> Result<()> {
        self.table(name)?.delete_all()
    }

    pub fn lookup(&self, name: &str, key: &K) -> Result<Option<S>> {
        Ok(self.table(name)?.lookup(key))
    }

    pub fn select(&self, name: &str, order: Order, limit: Limit) -> Result<Vec<Record<S, K>>> {
        Ok(self.table(name)?.select(order, limit))
    }

    pub fn match_records<T, F>(&self, name: &str, f: F, order: Order, limit: Limit) -> Result<Vec<T>>
    where
        F: FnMut(&S, &K) -> Option<T>,
    {
        Ok(self.table(name)?.match_records(f, order, limit))
    }

    pub fn size(&self, name: &str) -> Result<usize> {
        Ok(self.table(name)?.size())
    }
}

impl<S: Score, K: RankKey> Default for Registry<S, K> {
    fn default() -> Self {
        Self::new()
    }
}
