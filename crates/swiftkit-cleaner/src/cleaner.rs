//! The reclamation thread and its registration tokens.
//!
//! Each [`Cleaner`] owns one background thread. Registered actions sit in a
//! live set until their [`Cleanable`] is dropped, at which point the token's
//! id is pushed onto an unbounded crossbeam channel that the thread drains.
//!
//! At-most-once: an action is removed from the live set before it runs, and
//! whoever fails to remove it (the queue or an explicit [`Cleanable::clean`])
//! skips it.
//!
//! The thread exits once every sender is gone: the `Cleaner` itself and all
//! outstanding `Cleanable`s. Until then the `Cleaner` handle acts as the entry
//! that keeps the thread alive even while no cleanables exist.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use indexmap::IndexMap;

use crate::config::CleanerConfig;
use crate::error::CleanerError;

type Action = Box<dyn FnOnce() + Send + 'static>;

/// Counters describing a cleaner's lifetime so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanerStats {
    /// Actions ever registered.
    pub registered: u64,
    /// Actions registered but not yet run.
    pub pending: u64,
    /// Actions that ran to completion.
    pub cleaned: u64,
    /// Actions that panicked (and were swallowed).
    pub panicked: u64,
}

/// State shared between the cleaner handle, its tokens and the thread.
struct Shared {
    live: Mutex<IndexMap<u64, Action>>,
    next_id: AtomicU64,
    registered: AtomicU64,
    cleaned: AtomicU64,
    panicked: AtomicU64,
    running: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            live: Mutex::new(IndexMap::new()),
            next_id: AtomicU64::new(0),
            registered: AtomicU64::new(0),
            cleaned: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            running: AtomicBool::new(false),
        }
    }

    fn insert(&self, action: Action) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, action);
        self.registered.fetch_add(1, Ordering::Relaxed);
        id
    }

    fn is_live(&self, id: u64) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    fn pending(&self) -> u64 {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len() as u64
    }

    /// Remove the action for `id` and run it. Returns `false` if it was
    /// already removed. Panics from the action are counted and logged.
    fn clean(&self, id: u64) -> bool {
        let action = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .swap_remove(&id);
        let Some(action) = action else {
            return false;
        };
        match panic::catch_unwind(AssertUnwindSafe(action)) {
            Ok(()) => {
                self.cleaned.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                self.panicked.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    cleanable = id,
                    panic = %panic_message(payload.as_ref()),
                    "cleanup action panicked; continuing"
                );
            }
        }
        true
    }

    fn stats(&self) -> CleanerStats {
        CleanerStats {
            registered: self.registered.load(Ordering::Relaxed),
            pending: self.pending(),
            cleaned: self.cleaned.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Runs cleanup actions on a background thread once their tokens drop.
pub struct Cleaner {
    shared: Arc<Shared>,
    queue: Sender<u64>,
}

// Compile-time assertion: Cleaner must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Cleaner>();
    assert::<Cleanable>();
};

impl Cleaner {
    /// Start a cleaner with the default configuration.
    pub fn new() -> Result<Self, CleanerError> {
        Self::with_config(CleanerConfig::default())
    }

    /// Start a cleaner and its reclamation thread.
    pub fn with_config(config: CleanerConfig) -> Result<Self, CleanerError> {
        config.validate()?;

        let (queue, ready) = crossbeam_channel::unbounded();
        let shared = Arc::new(Shared::new());
        shared.running.store(true, Ordering::Release);

        let thread_shared = Arc::clone(&shared);
        let poll_interval = config.poll_interval;
        thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || reclaim_loop(ready, thread_shared, poll_interval))
            .map_err(|e| CleanerError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        tracing::debug!(thread = %config.thread_name, "reclamation thread started");
        Ok(Self { shared, queue })
    }

    /// Register `action` to run once the returned token is dropped.
    ///
    /// The action must not own whatever owns the token, or the token can
    /// never be dropped.
    pub fn register<F>(&self, action: F) -> Cleanable
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.shared.insert(Box::new(action));
        Cleanable {
            id,
            shared: Arc::clone(&self.shared),
            queue: Some(self.queue.clone()),
        }
    }

    /// Current counters.
    pub fn stats(&self) -> CleanerStats {
        self.shared.stats()
    }

    /// A handle for observing this cleaner without keeping its thread alive.
    pub fn monitor(&self) -> CleanerMonitor {
        CleanerMonitor {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl fmt::Debug for Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleaner")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Read-only view of a cleaner's counters and thread state.
#[derive(Clone)]
pub struct CleanerMonitor {
    shared: Arc<Shared>,
}

impl CleanerMonitor {
    /// Current counters.
    pub fn stats(&self) -> CleanerStats {
        self.shared.stats()
    }

    /// Whether the reclamation thread is still running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CleanerMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanerMonitor")
            .field("stats", &self.stats())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Token tying a registered action to its owner's lifetime.
///
/// Dropping the token schedules the action on the reclamation thread.
/// [`clean`](Self::clean) runs it immediately on the calling thread instead.
#[must_use = "dropping a Cleanable schedules its cleanup immediately"]
pub struct Cleanable {
    id: u64,
    shared: Arc<Shared>,
    queue: Option<Sender<u64>>,
}

impl Cleanable {
    /// Identifier of the registered action, unique per cleaner.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the action has not run yet.
    pub fn is_pending(&self) -> bool {
        self.shared.is_live(self.id)
    }

    /// Run the action now, on this thread.
    ///
    /// Returns `false` if it had already run.
    pub fn clean(mut self) -> bool {
        self.queue = None;
        self.shared.clean(self.id)
    }
}

impl Drop for Cleanable {
    fn drop(&mut self) {
        let Some(queue) = self.queue.take() else {
            return;
        };
        if queue.send(self.id).is_err() {
            // Only reachable if the reclamation thread died.
            tracing::warn!(
                cleanable = self.id,
                "reclamation thread is gone; running cleanup inline"
            );
            self.shared.clean(self.id);
        }
    }
}

impl fmt::Debug for Cleanable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanable")
            .field("id", &self.id)
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Main loop of the reclamation thread.
///
/// Blocks on the queue with a timeout, runs each ready action, and exits
/// when the queue is drained and every sender has been dropped.
fn reclaim_loop(ready: Receiver<u64>, shared: Arc<Shared>, poll_interval: Duration) {
    loop {
        match ready.recv_timeout(poll_interval) {
            Ok(id) => {
                if !shared.clean(id) {
                    tracing::trace!(cleanable = id, "already cleaned explicitly");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::trace!(pending = shared.pending(), "reclamation queue idle");
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    shared.running.store(false, Ordering::Release);
    tracing::debug!("reclamation thread exiting; no outstanding cleanables");
}
