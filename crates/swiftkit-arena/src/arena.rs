//! The registration contract shared by both arena flavors.

use std::sync::Arc;

use swiftkit_cleaner::Cleanable;
use swiftkit_core::InstanceCleanup;

use crate::auto::AutoArena;
use crate::confined::ConfinedArena;
use crate::error::ArenaError;

/// An owner of disposal actions.
///
/// Implementations take ownership of `cleanup` and guarantee it runs at
/// most once. On error the cleanup is dropped unrun and the foreign
/// resource stays with the caller.
pub trait SwiftArena {
    /// Take ownership of the disposal action for one instance.
    fn register(&self, cleanup: InstanceCleanup) -> Result<Registration, ArenaError>;
}

impl<A: SwiftArena + ?Sized> SwiftArena for &A {
    fn register(&self, cleanup: InstanceCleanup) -> Result<Registration, ArenaError> {
        (**self).register(cleanup)
    }
}

impl<A: SwiftArena + ?Sized> SwiftArena for Arc<A> {
    fn register(&self, cleanup: InstanceCleanup) -> Result<Registration, ArenaError> {
        (**self).register(cleanup)
    }
}

/// Receipt for a registered instance, held by its instance state.
///
/// For auto arenas the receipt is the reachability token: dropping it
/// schedules the disposal.
#[derive(Debug)]
#[must_use = "dropping the registration of an auto-arena instance disposes it"]
pub struct Registration {
    kind: RegistrationKind,
}

#[derive(Debug)]
enum RegistrationKind {
    /// Disposal happens when the owning arena closes.
    Scoped,
    /// Disposal happens after the token drops.
    Tracked(Cleanable),
}

impl Registration {
    pub(crate) fn scoped() -> Self {
        Self {
            kind: RegistrationKind::Scoped,
        }
    }

    pub(crate) fn tracked(token: Cleanable) -> Self {
        Self {
            kind: RegistrationKind::Tracked(token),
        }
    }

    /// Whether disposal is triggered by this registration being dropped.
    pub fn is_tracked(&self) -> bool {
        matches!(self.kind, RegistrationKind::Tracked(_))
    }
}

/// Entry points for creating arenas.
#[derive(Debug)]
pub struct Arena;

impl Arena {
    /// A confined arena bound to the calling thread.
    pub fn confined() -> ConfinedArena {
        ConfinedArena::new()
    }

    /// An auto arena with its own reclamation thread.
    pub fn auto() -> Result<AutoArena, ArenaError> {
        AutoArena::new()
    }
}
