//! Single writer for a rank table.
//!
//! Every mutation is sent to one coordinator thread over an mpsc mailbox and
//! applied to completion before the next one is taken, so writes are totally
//! ordered. Callers wait for the reply on a per-request channel with a
//! deadline. Readers never go through here.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::constants::COORDINATOR_THREAD_PREFIX;

use super::error::{Error, Result};
use super::key_index::KeyIndex;
use super::score_index::ScoreIndex;
use super::types::{RankKey, Score};

/// The two indexes of one table. Shared by the coordinator (sole mutator)
/// and every reader.
pub(crate) struct Indexes<S, K> {
    pub(crate) keys: KeyIndex<K, S>,
    pub(crate) scores: ScoreIndex<S, K>,
}

impl<S: Score, K: RankKey> Indexes<S, K> {
    pub(crate) fn new(keys_name: String, scores_name: String) -> Self {
        Self {
            keys: KeyIndex::new(keys_name),
            scores: ScoreIndex::new(scores_name),
        }
    }

    /// Insert-or-update. Readers can observe the intermediate steps.
    fn apply_insert(&self, score: S, key: K) -> bool {
        if let Some(old) = self.keys.get(&key) {
            if old == score {
                return false;
            }
            self.scores.remove(&old, &key);
            self.keys.remove(&key);
        }
        self.keys.put(key.clone(), score.clone());
        self.scores.insert(score, key);
        true
    }

    fn apply_delete(&self, key: &K) -> bool {
        match self.keys.remove(key) {
            Some(old) => {
                self.scores.remove(&old, key);
                true
            }
            None => false,
        }
    }

    fn apply_clear(&self) {
        self.scores.clear();
        self.keys.clear();
    }
}

pub(crate) enum Request<S, K> {
    Insert { score: S, key: K, reply: mpsc::Sender<()> },
    /// Replies whether the key was present.
    Delete { key: K, reply: mpsc::Sender<bool> },
    Clear { reply: mpsc::Sender<()> },
    Stop { reply: mpsc::Sender<()> },
    /// Blocks the coordinator, letting tests drive a call past its deadline.
    #[cfg(test)]
    Stall { duration: Duration, reply: mpsc::Sender<()> },
}

/// Handle to a running coordinator thread.
pub(crate) struct Coordinator<S, K> {
    table: String,
    mailbox: mpsc::Sender<Request<S, K>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Held for the whole of `stop`, so concurrent stops return only once
    /// the thread has been joined.
    stopping: Mutex<()>,
}

impl<S: Score, K: RankKey> Coordinator<S, K> {
    /// Spawn the coordinator thread for `table`, taking ownership of all
    /// writes to `indexes`.
    pub(crate) fn spawn(table: &str, indexes: Arc<Indexes<S, K>>) -> Result<Self> {
        let (mailbox, inbox) = mpsc::channel::<Request<S, K>>();
        let thread_table = table.to_string();

        let worker = std::thread::Builder::new()
            .name(format!("{}-{}", COORDINATOR_THREAD_PREFIX, table))
            .spawn(move || run(thread_table, indexes, inbox))
            .map_err(|source| {
                error!(table, "failed to spawn coordinator thread: {}", source);
                Error::Spawn {
                    table: table.to_string(),
                    source,
                }
            })?;

        info!(table, "coordinator started");
        Ok(Self {
            table: table.to_string(),
            mailbox,
            worker: Mutex::new(Some(worker)),
            stopping: Mutex::new(()),
        })
    }

    pub(crate) fn insert(&self, score: S, key: K, timeout: Duration) -> Result<()> {
        self.call(|reply| Request::Insert { score, key, reply }, timeout)
    }

    pub(crate) fn delete(&self, key: K, timeout: Duration) -> Result<bool> {
        self.call(|reply| Request::Delete { key, reply }, timeout)
    }

    pub(crate) fn clear(&self, timeout: Duration) -> Result<()> {
        self.call(|reply| Request::Clear { reply }, timeout)
    }

    #[cfg(test)]
    pub(crate) fn stall(&self, duration: Duration, timeout: Duration) -> Result<()> {
        self.call(|reply| Request::Stall { duration, reply }, timeout)
    }

    /// Ask the coordinator to drop its table and exit, then join it.
    /// Stopping an already stopped coordinator is a no-op. A concurrent
    /// second call waits for the first to finish.
    pub(crate) fn stop(&self, timeout: Duration) -> Result<()> {
        let _stopping = self.stopping.lock();
        if self.worker.lock().is_none() {
            return Ok(());
        }

        // On timeout the handle stays in place so a later stop can retry.
        match self.call(|reply| Request::Stop { reply }, timeout) {
            Ok(()) | Err(Error::CoordinatorGone { .. }) => {}
            Err(e) => return Err(e),
        }

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                warn!(table = %self.table, "coordinator thread panicked");
            }
        }
        info!(table = %self.table, "coordinator stopped");
        Ok(())
    }

    pub(crate) fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    fn call<R, F>(&self, make: F, timeout: Duration) -> Result<R>
    where
        F: FnOnce(mpsc::Sender<R>) -> Request<S, K>,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        if self.mailbox.send(make(reply_tx)).is_err() {
            warn!(table = %self.table, "call to stopped coordinator");
            return Err(self.gone());
        }

        match reply_rx.recv_timeout(timeout) {
            Ok(reply) => Ok(reply),
            Err(RecvTimeoutError::Timeout) => {
                warn!(table = %self.table, ?timeout, "coordinator call timed out");
                Err(Error::Timeout {
                    table: self.table.clone(),
                    waited: timeout,
                })
            }
            // The request was dropped unanswered: the coordinator exited.
            Err(RecvTimeoutError::Disconnected) => Err(self.gone()),
        }
    }

    fn gone(&self) -> Error {
        Error::CoordinatorGone {
            table: self.table.clone(),
        }
    }
}

fn run<S: Score, K: RankKey>(table: String, indexes: Arc<Indexes<S, K>>, inbox: mpsc::Receiver<Request<S, K>>) {
    for request in inbox {
        match request {
            Request::Insert { score, key, reply } => {
                let changed = indexes.apply_insert(score, key);
                debug!(table = %table, changed, "insert applied");
                let _ = reply.send(());
            }
            Request::Delete { key, reply } => {
                let existed = indexes.apply_delete(&key);
                debug!(table = %table, existed, "delete applied");
                let _ = reply.send(existed);
            }
            Request::Clear { reply } => {
                indexes.apply_clear();
                debug!(table = %table, "clear applied");
                let _ = reply.send(());
            }
            Request::Stop { reply } => {
                indexes.apply_clear();
                let _ = reply.send(());
                break;
            }
            #[cfg(test)]
            Request::Stall { duration, reply } => {
                std::thread::sleep(duration);
                let _ = reply.send(());
            }
        }
    }
    debug!(table = %table, "coordinator mailbox closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_test(table: &str) -> (Coordinator<u32, String>, Arc<Indexes<u32, String>>) {
        let indexes = Arc::new(Indexes::new(format!("{table}.keys"), format!("{table}.scores")));
        let coordinator = Coordinator::spawn(table, indexes.clone()).unwrap();
        (coordinator, indexes)
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_insert_then_update() {
        let (coord, indexes) = spawn_test("update");
        coord.insert(5, "bar".to_string(), WAIT).unwrap();
        coord.insert(10, "bar".to_string(), WAIT).unwrap();

        assert_eq!(indexes.keys.get(&"bar".to_string()), Some(10));
        assert!(indexes.scores.contains(&10, &"bar".to_string()));
        assert!(!indexes.scores.contains(&5, &"bar".to_string()));
        assert_eq!(indexes.scores.len(), 1);
        assert_eq!(indexes.keys.count(), 1);
    }

    #[test]
    fn test_insert_same_pair_is_noop() {
        let indexes: Indexes<u32, &'static str> = Indexes::new("t.keys".into(), "t.scores".into());
        assert!(indexes.apply_insert(3, "k"));
        assert!(!indexes.apply_insert(3, "k"));
        assert_eq!(indexes.scores.len(), 1);
    }

    #[test]
    fn test_delete_reports_presence() {
        let (coord, indexes) = spawn_test("delete");
        coord.insert(1, "a".to_string(), WAIT).unwrap();
        assert!(coord.delete("a".to_string(), WAIT).unwrap());
        assert!(!coord.delete("a".to_string(), WAIT).unwrap());
        assert!(indexes.scores.is_empty());
        assert!(indexes.keys.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (coord, indexes) = spawn_test("clear");
        for i in 0..10 {
            coord.insert(i, format!("k{i}"), WAIT).unwrap();
        }
        coord.clear(WAIT).unwrap();
        coord.clear(WAIT).unwrap();
        assert!(indexes.scores.is_empty());
        assert!(indexes.keys.is_empty());
    }

    #[test]
    fn test_stalled_coordinator_times_out() {
        let (coord, _indexes) = spawn_test("stall");

        let err = coord
            .stall(Duration::from_millis(300), Duration::from_millis(20))
            .unwrap_err();
        assert!(err.is_timeout());

        // The coordinator keeps serving once the stall ends.
        coord.insert(1, "late".to_string(), WAIT).unwrap();
    }

    #[test]
    fn test_concurrent_stop_waits_for_join() {
        let (coord, indexes) = spawn_test("double_stop");
        let coord = Arc::new(coord);
        coord.insert(1, "a".to_string(), WAIT).unwrap();

        let staller = {
            let coord = Arc::clone(&coord);
            std::thread::spawn(move || coord.stall(Duration::from_millis(300), WAIT))
        };
        std::thread::sleep(Duration::from_millis(50));

        let first = {
            let coord = Arc::clone(&coord);
            std::thread::spawn(move || coord.stop(WAIT))
        };
        std::thread::sleep(Duration::from_millis(20));

        // Still draining the stall, so the second stop must not return early.
        coord.stop(WAIT).unwrap();
        assert!(!coord.is_running());
        assert!(indexes.keys.is_empty());
        assert!(indexes.scores.is_empty());

        first.join().unwrap().unwrap();
        staller.join().unwrap().unwrap();
    }

    #[test]
    fn test_stop_timeout_keeps_coordinator() {
        let (coord, _indexes) = spawn_test("stop_timeout");
        let coord = Arc::new(coord);

        let staller = {
            let coord = Arc::clone(&coord);
            std::thread::spawn(move || coord.stall(Duration::from_millis(300), WAIT))
        };
        std::thread::sleep(Duration::from_millis(50));

        let err = coord.stop(Duration::from_millis(20)).unwrap_err();
        assert!(err.is_timeout());
        assert!(coord.is_running());

        staller.join().unwrap().unwrap();
        // The timed-out Stop was still queued and has since been applied.
        coord.stop(WAIT).unwrap();
        assert!(!coord.is_running());
    }

    #[test]
    fn test_calls_after_stop_fail() {
        let (coord, indexes) = spawn_test("stopped");
        coord.insert(1, "a".to_string(), WAIT).unwrap();
        assert!(coord.is_running());

        coord.stop(WAIT).unwrap();
        assert!(!coord.is_running());
        assert!(indexes.keys.is_empty());

        let err = coord.insert(2, "b".to_string(), WAIT).unwrap_err();
        assert!(matches!(err, Error::CoordinatorGone { .. }));

        // Second stop is a no-op.
        coord.stop(WAIT).unwrap();
    }
}
