//! Explicit-scope arena bound to one thread.
//!
//! State machine: `ACTIVE → CLOSED`, performed once by compare-and-swap.
//! Only the thread that wins the transition runs the pending actions, so
//! repeated or concurrent closes never dispose anything twice.

use std::mem;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::ThreadId;
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use swiftkit_core::{DisposalError, InstanceCleanup};

use crate::arena::{Registration, SwiftArena};
use crate::config::ArenaConfig;
use crate::confinement::ThreadConfinement;
use crate::error::{ArenaError, CloseError};

const CLOSED: u8 = 0;
const ACTIVE: u8 = 1;

/// Outcome of a successful [`ConfinedArena::close`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloseReport {
    /// Instances destroyed by this call.
    pub disposed: usize,
    /// Whether this call performed the ACTIVE → CLOSED transition.
    /// `false` means the arena was already closed and nothing ran.
    pub transitioned: bool,
    /// Time spent disposing.
    pub elapsed: Duration,
}

/// Arena whose instances are destroyed together when it is closed.
///
/// Register and close must happen on the thread that created the arena
/// (unless confinement is disabled in [`ArenaConfig`]). Dropping an
/// active arena closes it.
pub struct ConfinedArena {
    state: AtomicU8,
    confinement: ThreadConfinement,
    resources: Mutex<Vec<InstanceCleanup>>,
}

// Compile-time assertion: the arena may be shared with (and rejected by)
// other threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ConfinedArena>();
};

impl ConfinedArena {
    /// A confined arena bound to the calling thread.
    pub fn new() -> Self {
        Self::build(&ArenaConfig::default())
    }

    /// An arena built from a validated `config`.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &ArenaConfig) -> Self {
        let confinement = if config.thread_confinement {
            ThreadConfinement::current()
        } else {
            ThreadConfinement::unconfined()
        };
        tracing::debug!(owner = ?confinement.owner(), "confined arena opened");
        Self {
            state: AtomicU8::new(ACTIVE),
            confinement,
            resources: Mutex::new(Vec::with_capacity(config.initial_capacity)),
        }
    }

    /// Whether the arena has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CLOSED
    }

    /// Number of registered instances not yet disposed.
    pub fn pending(&self) -> usize {
        self.lock_resources().len()
    }

    /// The thread the arena is bound to.
    pub fn owner(&self) -> Option<ThreadId> {
        self.confinement.owner()
    }

    /// The confinement policy in effect.
    pub fn confinement(&self) -> ThreadConfinement {
        self.confinement
    }

    /// Close the arena, destroying every registered instance.
    ///
    /// Fails with [`ArenaError::WrongThread`] off the owning thread, even if
    /// the arena is already closed. Closing a closed arena is a no-op.
    ///
    /// All pending instances are destroyed in registration order before this
    /// returns. A failing disposal does not stop the rest; failures are
    /// reported together as [`ArenaError::Disposal`].
    pub fn close(&self) -> Result<CloseReport, ArenaError> {
        self.confinement.check()?;
        let start = Instant::now();

        if self
            .state
            .compare_exchange(ACTIVE, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(CloseReport {
                disposed: 0,
                transitioned: false,
                elapsed: start.elapsed(),
            });
        }

        let pending = mem::take(&mut *self.lock_resources());
        let attempted = pending.len();
        let failures = dispose_in_order(pending);
        let elapsed = start.elapsed();

        tracing::debug!(
            attempted,
            failed = failures.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "confined arena closed"
        );

        if failures.is_empty() {
            Ok(CloseReport {
                disposed: attempted,
                transitioned: true,
                elapsed,
            })
        } else {
            Err(CloseError::new(attempted, failures).into())
        }
    }

    fn lock_resources(&self) -> MutexGuard<'_, Vec<InstanceCleanup>> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConfinedArena {
    fn default() -> Self {
        Self::new()
    }
}

impl SwiftArena for ConfinedArena {
    fn register(&self, cleanup: InstanceCleanup) -> Result<Registration, ArenaError> {
        self.confinement.check()?;
        let mut resources = self.lock_resources();
        // Re-checked under the lock: close() swaps the state before taking
        // the list, so a push seen here is always disposed by that close.
        if self.is_closed() {
            return Err(ArenaError::Closed);
        }
        resources.push(cleanup);
        Ok(Registration::scoped())
    }
}

impl Drop for ConfinedArena {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if !self.confinement.is_owner() {
            tracing::warn!(
                owner = ?self.confinement.owner(),
                leaked = self.pending(),
                "confined arena dropped off its owning thread; pending instances leaked"
            );
            return;
        }
        if let Err(e) = self.close() {
            tracing::error!(error = %e, "confined arena dropped with disposal failures");
        }
    }
}

impl std::fmt::Debug for ConfinedArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfinedArena")
            .field("closed", &self.is_closed())
            .field("owner", &self.owner())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Run each cleanup once, in order, collecting failures.
fn dispose_in_order(pending: Vec<InstanceCleanup>) -> SmallVec<[DisposalError; 4]> {
    let mut failures = SmallVec::new();
    for cleanup in pending {
        if let Err(e) = cleanup.run_catching() {
            tracing::warn!(error = %e, "instance leaked during arena close");
            failures.push(e);
        }
    }
    failures
}
