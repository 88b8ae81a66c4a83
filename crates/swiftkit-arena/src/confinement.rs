//! Thread-confinement check for confined arenas.

use std::thread::{self, ThreadId};

use crate::error::ArenaError;

/// The thread an arena is bound to, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadConfinement {
    owner: Option<ThreadId>,
}

impl ThreadConfinement {
    /// Bind to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: Some(thread::current().id()),
        }
    }

    /// No owner; every thread passes the check.
    pub fn unconfined() -> Self {
        Self { owner: None }
    }

    /// The owning thread.
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner
    }

    /// Whether an owner is enforced.
    pub fn is_confined(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether the calling thread passes the check.
    pub fn is_owner(&self) -> bool {
        self.owner.is_none_or(|owner| owner == thread::current().id())
    }

    /// Fail with [`ArenaError::WrongThread`] unless called from the owner.
    pub fn check(&self) -> Result<(), ArenaError> {
        match self.owner {
            Some(owner) => {
                let caller = thread::current().id();
                if owner == caller {
                    Ok(())
                } else {
                    Err(ArenaError::WrongThread { owner, caller })
                }
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes() {
        let c = ThreadConfinement::current();
        assert!(c.is_confined());
        assert!(c.is_owner());
        assert!(c.check().is_ok());
    }

    #[test]
    fn other_thread_fails() {
        let c = ThreadConfinement::current();
        let owner = thread::current().id();
        let result = thread::spawn(move || (c.is_owner(), c.check(), thread::current().id()))
            .join()
            .unwrap();
        assert!(!result.0);
        assert_eq!(
            result.1,
            Err(ArenaError::WrongThread {
                owner,
                caller: result.2,
            })
        );
    }

    #[test]
    fn unconfined_passes_everywhere() {
        let c = ThreadConfinement::unconfined();
        assert!(!c.is_confined());
        assert_eq!(c.owner(), None);
        let ok = thread::spawn(move || c.check().is_ok()).join().unwrap();
        assert!(ok);
    }
}
