//! Worker Reaper
//!
//! Tracks spawned workers and reclaims the ones that have finished.
//!
//! ## Design
//! - Each worker thread carries a completion guard that posts its id on a
//!   channel when the thread unwinds or returns
//! - Only the notifier thread consumes that channel; it records each id and
//!   keeps reaping until every signalled worker has exited
//! - `reap()` joins every worker whose thread has exited and never waits on
//!   a running one; it also runs after every spawn

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::Result;
use super::WorkerId;

/// How long the notifier waits for a signalled worker to finish exiting
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Worker table, guarded as one unit
#[derive(Default)]
struct Table {
    /// Live or finished-but-unreclaimed workers
    workers: HashMap<WorkerId, JoinHandle<()>>,

    /// Workers that signalled completion but had not exited at the last pass
    notified: HashSet<WorkerId>,
}

/// Reclaims finished worker threads without blocking the accept loop
pub struct Reaper {
    table: Mutex<Table>,
    next_id: AtomicU64,
    done_tx: Sender<WorkerId>,
}

/// Posts the worker id on drop, so panics are reported too
struct CompletionGuard {
    id: WorkerId,
    done_tx: Sender<WorkerId>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        // Receiver lives on the notifier thread; nothing to do if it has stopped
        let _ = self.done_tx.send(self.id);
    }
}

impl Reaper {
    /// Create a reaper and start its notifier thread
    pub fn start() -> Result<Arc<Self>> {
        let (done_tx, done_rx) = unbounded();
        let reaper = Arc::new(Self {
            table: Mutex::new(Table::default()),
            next_id: AtomicU64::new(1),
            done_tx,
        });

        let weak = Arc::downgrade(&reaper);
        thread::Builder::new()
            .name("reaper".to_string())
            .spawn(move || notify_loop(weak, done_rx))?;

        Ok(reaper)
    }

    /// Run `work` on a new worker thread and record it in the table
    pub fn spawn<F>(&self, work: F) -> Result<WorkerId>
    where
        F: FnOnce(WorkerId) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = CompletionGuard {
            id,
            done_tx: self.done_tx.clone(),
        };

        // Hold the table while spawning so a fast worker can't be reaped
        // before it is recorded
        let mut table = self.table.lock();
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || {
                let _guard = guard;
                work(id);
            })?;
        table.workers.insert(id, handle);

        tracing::debug!("spawned worker {}", id);
        Ok(id)
    }

    /// Reclaim every worker that has finished; never blocks on a live one
    ///
    /// Returns the number of workers reclaimed by this pass.
    pub fn reap(&self) -> usize {
        let mut table = self.table.lock();

        let finished: Vec<WorkerId> = table
            .workers
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        for id in &finished {
            if let Some(handle) = table.workers.remove(id) {
                match handle.join() {
                    Ok(()) => tracing::debug!("reaped worker {}", id),
                    Err(_) => tracing::error!("reaped worker {} (panicked)", id),
                }
            }
        }

        let Table { workers, notified } = &mut *table;
        notified.retain(|id| workers.contains_key(id));

        finished.len()
    }

    /// Workers spawned and not yet reclaimed
    pub fn active(&self) -> usize {
        self.table.lock().workers.len()
    }

    fn has_pending_exits(&self) -> bool {
        !self.table.lock().notified.is_empty()
    }

    fn note_completion(&self, id: WorkerId) {
        self.table.lock().notified.insert(id);
    }
}

/// Wake on completion notifications and reap
///
/// A worker signals just before its thread exits, so a pass may find it not
/// yet finished; keep polling until every signalled worker is reclaimed.
fn notify_loop(weak: Weak<Reaper>, done_rx: Receiver<WorkerId>) {
    while let Ok(id) = done_rx.recv() {
        let Some(reaper) = weak.upgrade() else {
            break;
        };

        tracing::trace!("worker {} signalled completion", id);
        reaper.note_completion(id);
        reaper.reap();
        while reaper.has_pending_exits() {
            thread::sleep(EXIT_POLL_INTERVAL);
            reaper.reap();
        }
    }
    tracing::debug!("reaper notifier stopped");
}
