//! Hand-written stand-ins for generated wrappers.

use std::sync::Arc;

use swiftkit_arena::{ArenaError, InstanceState, SwiftArena, SwiftInstance};
use swiftkit_core::{ForeignAddress, InstanceError, SwiftTypeRef};

use crate::heap::{MockHeap, MockRuntime};

/// Wrapper around a `MySwiftClass` object on a [`MockRuntime`] heap.
#[derive(Debug)]
pub struct FakeSwiftClass {
    state: InstanceState,
    heap: Arc<MockHeap>,
}

impl FakeSwiftClass {
    pub const TYPE_NAME: &'static str = "MySwiftClass";

    /// Allocate a new object holding `payload` and register it with `arena`.
    ///
    /// If registration fails the object is released again, as generated
    /// glue would.
    pub fn new<A: SwiftArena + ?Sized>(
        runtime: &MockRuntime,
        payload: i64,
        arena: &A,
    ) -> Result<Self, ArenaError> {
        let heap = Arc::clone(runtime.heap());
        let address = heap.allocate(Self::TYPE_NAME, payload);
        match InstanceState::new(address, runtime.class_type(Self::TYPE_NAME), arena) {
            Ok(state) => Ok(Self { state, heap }),
            Err(e) => {
                heap.release(address);
                Err(e)
            }
        }
    }

    pub fn echo_int(&self, i: i64) -> Result<i64, InstanceError> {
        self.state.call(|_| i)
    }

    /// Read the object's payload through its address.
    pub fn payload(&self) -> Result<i64, InstanceError> {
        self.state.call(|address| {
            self.heap
                .payload(address)
                .expect("live wrapper points at a freed object")
        })
    }

    /// Take an extra strong reference on the Swift side, as if the object
    /// escaped into Swift code.
    pub fn retain_elsewhere(&self) -> Result<u64, InstanceError> {
        self.state.call(|address| {
            self.heap
                .retain(address)
                .expect("live wrapper points at a freed object")
        })
    }
}

impl SwiftInstance for FakeSwiftClass {
    fn instance_state(&self) -> &InstanceState {
        &self.state
    }
}

/// Wrapper around a `MySwiftStruct` value on a [`MockRuntime`] heap.
#[derive(Debug)]
pub struct FakeSwiftStruct {
    state: InstanceState,
    heap: Arc<MockHeap>,
}

impl FakeSwiftStruct {
    pub const TYPE_NAME: &'static str = "MySwiftStruct";

    pub fn new<A: SwiftArena + ?Sized>(
        runtime: &MockRuntime,
        capacity: i64,
        arena: &A,
    ) -> Result<Self, ArenaError> {
        let heap = Arc::clone(runtime.heap());
        let address = heap.allocate(Self::TYPE_NAME, capacity);
        match InstanceState::new(address, runtime.struct_type(Self::TYPE_NAME), arena) {
            Ok(state) => Ok(Self { state, heap }),
            Err(e) => {
                heap.destroy(address);
                Err(e)
            }
        }
    }

    pub fn capacity(&self) -> Result<i64, InstanceError> {
        self.state.call(|address| {
            self.heap
                .payload(address)
                .expect("live wrapper points at a freed value")
        })
    }
}

impl SwiftInstance for FakeSwiftStruct {
    fn instance_state(&self) -> &InstanceState {
        &self.state
    }
}

/// Wrapper over an arbitrary address and descriptor, for types with no heap.
#[derive(Debug)]
pub struct FakeInstance {
    state: InstanceState,
}

impl FakeInstance {
    pub fn new<A: SwiftArena + ?Sized>(
        address: ForeignAddress,
        ty: SwiftTypeRef,
        arena: &A,
    ) -> Result<Self, ArenaError> {
        Ok(Self {
            state: InstanceState::new(address, ty, arena)?,
        })
    }

    /// A guarded no-op method.
    pub fn touch(&self) -> Result<ForeignAddress, InstanceError> {
        self.state.call(|address| address)
    }
}

impl SwiftInstance for FakeInstance {
    fn instance_state(&self) -> &InstanceState {
        &self.state
    }
}
