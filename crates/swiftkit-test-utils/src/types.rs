//! Mock [`SwiftType`] implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use swiftkit_core::{ForeignAddress, SwiftType, TypeKind};

use crate::heap::MockHeap;

/// A reference type on a [`MockHeap`]. Destroy is the arena's final release.
#[derive(Debug)]
pub struct MockClassType {
    name: String,
    heap: Arc<MockHeap>,
}

impl MockClassType {
    pub fn new(name: &str, heap: Arc<MockHeap>) -> Self {
        Self {
            name: name.to_owned(),
            heap,
        }
    }
}

impl SwiftType for MockClassType {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Reference
    }

    fn retain_count(&self, address: ForeignAddress) -> Option<u64> {
        self.heap.retain_count(address)
    }

    fn destroy(&self, address: ForeignAddress) {
        self.heap.release(address);
    }
}

/// A value type on a [`MockHeap`], destroyed in place.
#[derive(Debug)]
pub struct MockStructType {
    name: String,
    heap: Arc<MockHeap>,
}

impl MockStructType {
    pub fn new(name: &str, heap: Arc<MockHeap>) -> Self {
        Self {
            name: name.to_owned(),
            heap,
        }
    }
}

impl SwiftType for MockStructType {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Value
    }

    fn destroy(&self, address: ForeignAddress) {
        self.heap.destroy(address);
    }
}

/// A heap-less type that records every destroy call.
///
/// Useful when only ordering and counts matter. The reported retain count
/// applies to every address and can be changed mid-test.
#[derive(Debug)]
pub struct CountingType {
    name: String,
    kind: TypeKind,
    retain_count: AtomicU64,
    destroyed: Mutex<Vec<ForeignAddress>>,
    panic_on_destroy: bool,
}

impl CountingType {
    pub fn reference(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, TypeKind::Reference, false))
    }

    pub fn value(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, TypeKind::Value, false))
    }

    /// A value type whose destroy routine panics after recording the call.
    pub fn panicking(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, TypeKind::Value, true))
    }

    fn build(name: &str, kind: TypeKind, panic_on_destroy: bool) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            retain_count: AtomicU64::new(1),
            destroyed: Mutex::new(Vec::new()),
            panic_on_destroy,
        }
    }

    pub fn set_retain_count(&self, count: u64) {
        self.retain_count.store(count, Ordering::SeqCst);
    }

    pub fn destroy_count(&self) -> usize {
        self.destroyed.lock().unwrap().len()
    }

    /// Destroyed addresses in call order.
    pub fn destroyed(&self) -> Vec<ForeignAddress> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl SwiftType for CountingType {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        self.kind
    }

    fn retain_count(&self, _address: ForeignAddress) -> Option<u64> {
        Some(self.retain_count.load(Ordering::SeqCst))
    }

    fn destroy(&self, address: ForeignAddress) {
        self.destroyed.lock().unwrap().push(address);
        if self.panic_on_destroy {
            panic!("{} destroy failed at {address}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_type_releases_through_heap() {
        let heap = MockHeap::new();
        let ty = MockClassType::new("MySwiftClass", Arc::clone(&heap));
        let a = heap.allocate("MySwiftClass", 0);
        assert_eq!(ty.retain_count(a), Some(1));
        ty.destroy(a);
        assert!(!heap.is_live(a));
    }

    #[test]
    fn counting_type_records_order() {
        let ty = CountingType::value("Point");
        ty.destroy(ForeignAddress(2));
        ty.destroy(ForeignAddress(1));
        assert_eq!(ty.destroyed(), vec![ForeignAddress(2), ForeignAddress(1)]);
        assert_eq!(ty.destroy_count(), 2);
    }
}
