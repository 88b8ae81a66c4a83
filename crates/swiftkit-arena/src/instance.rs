//! The state every Swift wrapper carries, and the contract around it.
//!
//! Generated wrappers hold one [`InstanceState`] and implement
//! [`SwiftInstance`] by returning it. Each wrapper method then goes through
//! [`InstanceState::call`] (or checks [`ensure_alive`](InstanceState::ensure_alive)
//! itself) before issuing its downcall.

use std::sync::Arc;

use swiftkit_core::{ForeignAddress, InstanceCleanup, InstanceError, LivenessFlag, SwiftTypeRef};

use crate::arena::{Registration, SwiftArena};
use crate::error::ArenaError;

/// Address, type and liveness of one Swift instance, registered with an arena.
///
/// Not `Clone`: an instance registers exactly once, when its state is built.
#[derive(Debug)]
pub struct InstanceState {
    address: ForeignAddress,
    ty: SwiftTypeRef,
    liveness: LivenessFlag,
    registration: Registration,
}

impl InstanceState {
    /// Take ownership of the instance at `address` and register it with
    /// `arena`.
    ///
    /// Fails with [`InstanceError::InvalidAddress`] for a null address the
    /// type does not permit, and with the arena's error if registration is
    /// refused. In both cases the foreign instance is left untouched.
    pub fn new<A>(
        address: ForeignAddress,
        ty: SwiftTypeRef,
        arena: &A,
    ) -> Result<Self, ArenaError>
    where
        A: SwiftArena + ?Sized,
    {
        if address.is_null() && !ty.permits_null() {
            return Err(InstanceError::InvalidAddress {
                type_name: ty.name().to_owned(),
            }
            .into());
        }

        let liveness = LivenessFlag::new();
        let cleanup = InstanceCleanup::new(address, Arc::clone(&ty), liveness.clone());
        let registration = arena.register(cleanup)?;

        Ok(Self {
            address,
            ty,
            liveness,
            registration,
        })
    }

    /// Fail with [`InstanceError::UseAfterFree`] once the instance is destroyed.
    pub fn ensure_alive(&self) -> Result<(), InstanceError> {
        self.liveness.ensure_alive(self.ty.name())
    }

    /// The instance's address, after checking it is still alive.
    pub fn checked_address(&self) -> Result<ForeignAddress, InstanceError> {
        self.ensure_alive()?;
        Ok(self.address)
    }

    /// The instance's address without a liveness check.
    ///
    /// For generated glue that has already called
    /// [`ensure_alive`](Self::ensure_alive); application code should use
    /// [`checked_address`](Self::checked_address).
    pub fn raw_address(&self) -> ForeignAddress {
        self.address
    }

    /// Run `f` with the address if the instance is alive.
    pub fn call<R>(&self, f: impl FnOnce(ForeignAddress) -> R) -> Result<R, InstanceError> {
        let address = self.checked_address()?;
        Ok(f(address))
    }

    /// Whether the Swift type is reference-counted.
    pub fn is_reference_type(&self) -> bool {
        self.ty.kind().is_reference()
    }

    /// The instance's type descriptor.
    pub fn swift_type(&self) -> &SwiftTypeRef {
        &self.ty
    }

    /// Name of the instance's Swift type.
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// A shared handle to the liveness flag.
    pub fn liveness(&self) -> LivenessFlag {
        self.liveness.clone()
    }

    /// Whether the instance is disposed by reachability rather than by
    /// closing a scope.
    pub fn is_tracked(&self) -> bool {
        self.registration.is_tracked()
    }
}

/// A wrapper around one Swift value or object.
pub trait SwiftInstance {
    /// The wrapper's registered state.
    fn instance_state(&self) -> &InstanceState;

    /// Fail with [`InstanceError::UseAfterFree`] once the instance is destroyed.
    fn ensure_alive(&self) -> Result<(), InstanceError> {
        self.instance_state().ensure_alive()
    }

    /// The instance's address, after checking it is still alive.
    fn memory_address(&self) -> Result<ForeignAddress, InstanceError> {
        self.instance_state().checked_address()
    }

    /// Whether the Swift type is reference-counted.
    fn is_reference_type(&self) -> bool {
        self.instance_state().is_reference_type()
    }

    /// Name of the Swift type.
    fn type_name(&self) -> &str {
        self.instance_state().type_name()
    }
}

impl SwiftInstance for InstanceState {
    fn instance_state(&self) -> &InstanceState {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confined::ConfinedArena;
    use swiftkit_core::TypeDescriptor;

    fn point() -> SwiftTypeRef {
        TypeDescriptor::value("Point", |_| {}).into_ref()
    }

    #[test]
    fn alive_until_arena_closes() {
        let arena = ConfinedArena::new();
        let state = InstanceState::new(ForeignAddress(0x100), point(), &arena).unwrap();
        assert_eq!(state.checked_address(), Ok(ForeignAddress(0x100)));
        assert_eq!(state.call(|a| a.get() + 1), Ok(0x101));
        assert!(!state.is_reference_type());
        assert!(!state.is_tracked());

        arena.close().unwrap();
        let err = state.ensure_alive().unwrap_err();
        assert_eq!(
            err.to_string(),
            "attempted to call method on already destroyed instance of Point"
        );
        assert_eq!(state.memory_address(), Err(err));
        // Raw access stays available for diagnostics.
        assert_eq!(state.raw_address(), ForeignAddress(0x100));
    }

    #[test]
    fn null_address_rejected_unless_permitted() {
        let arena = ConfinedArena::new();
        let err = InstanceState::new(ForeignAddress::NULL, point(), &arena).unwrap_err();
        assert_eq!(
            err,
            ArenaError::Instance(InstanceError::InvalidAddress {
                type_name: "Point".into()
            })
        );
        assert_eq!(arena.pending(), 0);

        let empty = TypeDescriptor::value("Empty", |_| {})
            .permitting_null()
            .into_ref();
        let state = InstanceState::new(ForeignAddress::NULL, empty, &arena).unwrap();
        assert_eq!(state.type_name(), "Empty");
        assert_eq!(arena.pending(), 1);
    }

    #[test]
    fn construct_on_closed_arena_fails() {
        let arena = ConfinedArena::new();
        arena.close().unwrap();
        let err = InstanceState::new(ForeignAddress(0x8), point(), &arena).unwrap_err();
        assert_eq!(err, ArenaError::Closed);
    }

    #[test]
    fn works_through_trait_objects() {
        let arena = ConfinedArena::new();
        let dyn_arena: &dyn SwiftArena = &arena;
        let state = InstanceState::new(ForeignAddress(0x8), point(), dyn_arena).unwrap();
        let flag = state.liveness();
        drop(state);
        // Dropping the wrapper does not dispose a scoped instance.
        assert!(flag.is_alive());
        arena.close().unwrap();
        assert!(flag.is_destroyed());
    }
}
