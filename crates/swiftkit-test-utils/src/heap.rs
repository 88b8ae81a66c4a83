//! A fake Swift heap with retain counts and free tracking.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use swiftkit_core::{ForeignAddress, SwiftTypeRef, TypeRegistry};

use crate::slots::SlotTable;
use crate::types::{MockClassType, MockStructType};

struct Object {
    type_name: String,
    retain_count: u64,
    payload: i64,
}

/// Stands in for the Swift runtime's allocator.
///
/// Objects start with a retain count of 1. Freed addresses go stale, so a
/// second free or a late read is counted instead of aliasing a new object.
pub struct MockHeap {
    objects: Mutex<SlotTable<Object>>,
    freed: Mutex<Vec<ForeignAddress>>,
    invalid_frees: AtomicUsize,
}

impl MockHeap {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: Mutex::new(SlotTable::new()),
            freed: Mutex::new(Vec::new()),
            invalid_frees: AtomicUsize::new(0),
        })
    }

    /// Allocate an object of `type_name` holding `payload`.
    pub fn allocate(&self, type_name: &str, payload: i64) -> ForeignAddress {
        self.objects.lock().unwrap().insert(Object {
            type_name: type_name.to_owned(),
            retain_count: 1,
            payload,
        })
    }

    /// Increment the retain count. Returns the new count.
    pub fn retain(&self, address: ForeignAddress) -> Option<u64> {
        let mut objects = self.objects.lock().unwrap();
        let object = objects.get_mut(address)?;
        object.retain_count += 1;
        Some(object.retain_count)
    }

    /// Decrement the retain count, freeing the object at zero.
    /// Returns the new count, or `None` (and records an invalid free) if the
    /// address is not live.
    pub fn release(&self, address: ForeignAddress) -> Option<u64> {
        let mut objects = self.objects.lock().unwrap();
        let Some(object) = objects.get_mut(address) else {
            self.invalid_frees.fetch_add(1, Ordering::SeqCst);
            return None;
        };
        object.retain_count -= 1;
        let remaining = object.retain_count;
        if remaining == 0 {
            objects.remove(address);
            self.freed.lock().unwrap().push(address);
        }
        Some(remaining)
    }

    /// Free the object regardless of its retain count (value-type destroy).
    /// Returns `false` and records an invalid free if it was not live.
    pub fn destroy(&self, address: ForeignAddress) -> bool {
        if self.objects.lock().unwrap().remove(address).is_none() {
            self.invalid_frees.fetch_add(1, Ordering::SeqCst);
            return false;
        }
        self.freed.lock().unwrap().push(address);
        true
    }

    pub fn retain_count(&self, address: ForeignAddress) -> Option<u64> {
        self.objects
            .lock()
            .unwrap()
            .get(address)
            .map(|o| o.retain_count)
    }

    pub fn payload(&self, address: ForeignAddress) -> Option<i64> {
        self.objects.lock().unwrap().get(address).map(|o| o.payload)
    }

    pub fn type_name(&self, address: ForeignAddress) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(address)
            .map(|o| o.type_name.clone())
    }

    pub fn is_live(&self, address: ForeignAddress) -> bool {
        self.objects.lock().unwrap().get(address).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Freed addresses in the order they were freed.
    pub fn freed(&self) -> Vec<ForeignAddress> {
        self.freed.lock().unwrap().clone()
    }

    /// Frees or releases of addresses that were not live.
    pub fn invalid_frees(&self) -> usize {
        self.invalid_frees.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MockHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHeap")
            .field("live", &self.live_count())
            .field("invalid_frees", &self.invalid_frees())
            .finish()
    }
}

/// A heap plus the type descriptors of the classes and structs living on it.
///
/// Descriptors are cached in a [`TypeRegistry`], the way bindings resolve
/// each type once.
#[derive(Debug)]
pub struct MockRuntime {
    heap: Arc<MockHeap>,
    types: TypeRegistry,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            heap: MockHeap::new(),
            types: TypeRegistry::new(),
        }
    }

    pub fn heap(&self) -> &Arc<MockHeap> {
        &self.heap
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Descriptor of the reference type `name`.
    pub fn class_type(&self, name: &str) -> SwiftTypeRef {
        self.types.get_or_register(name, || {
            Arc::new(MockClassType::new(name, Arc::clone(&self.heap))) as SwiftTypeRef
        })
    }

    /// Descriptor of the value type `name`.
    pub fn struct_type(&self, name: &str) -> SwiftTypeRef {
        self.types.get_or_register(name, || {
            Arc::new(MockStructType::new(name, Arc::clone(&self.heap))) as SwiftTypeRef
        })
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_frees_at_zero() {
        let heap = MockHeap::new();
        let a = heap.allocate("MySwiftClass", 7);
        assert_eq!(heap.retain(a), Some(2));
        assert_eq!(heap.release(a), Some(1));
        assert!(heap.is_live(a));
        assert_eq!(heap.release(a), Some(0));
        assert!(!heap.is_live(a));
        assert_eq!(heap.freed(), vec![a]);
        assert_eq!(heap.release(a), None);
        assert_eq!(heap.invalid_frees(), 1);
    }

    #[test]
    fn destroy_detects_double_free() {
        let heap = MockHeap::new();
        let a = heap.allocate("Point", 1);
        assert_eq!(heap.payload(a), Some(1));
        assert_eq!(heap.type_name(a).as_deref(), Some("Point"));
        assert!(heap.destroy(a));
        assert!(!heap.destroy(a));
        assert_eq!(heap.invalid_frees(), 1);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn runtime_caches_descriptors() {
        let runtime = MockRuntime::new();
        let a = runtime.class_type("MySwiftClass");
        let b = runtime.class_type("MySwiftClass");
        assert!(Arc::ptr_eq(&a, &b));
        runtime.struct_type("Point");
        assert_eq!(runtime.types().names(), vec!["MySwiftClass", "Point"]);
    }
}
