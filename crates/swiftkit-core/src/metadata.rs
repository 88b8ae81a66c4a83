//! Type descriptors: how a foreign type is destroyed.
//!
//! Every wrapper supplies its type's destruction capability explicitly at
//! construction time. There is no runtime lookup of a destroy method; the
//! binding layer either implements [`SwiftType`] directly or builds a
//! [`TypeDescriptor`] from the downcalls it already has.

use std::fmt;
use std::sync::Arc;

use crate::address::ForeignAddress;

/// Destruction strategy of a foreign type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A reference-counted heap object (`class` or `actor`).
    ///
    /// Destroying it releases the arena's reference, which runs `deinit`.
    Reference,
    /// A value type (`struct` or `enum`) destroyed in place through its
    /// value witness table.
    Value,
}

impl TypeKind {
    /// Whether this is a reference-counted type.
    pub fn is_reference(self) -> bool {
        matches!(self, Self::Reference)
    }
}

/// Per-type destruction capability.
///
/// Implementations must be callable from any thread: disposal happens on the
/// owning thread for confined arenas and on the reclamation thread for auto
/// arenas.
pub trait SwiftType: Send + Sync + fmt::Debug {
    /// The Swift type name, used in diagnostics.
    fn name(&self) -> &str;

    /// Reference-counted or value semantics.
    fn kind(&self) -> TypeKind;

    /// Current retain count of the object at `address`.
    ///
    /// Only consulted for [`TypeKind::Reference`]. `None` means the count is
    /// not observable and the pre-release check is skipped.
    fn retain_count(&self, address: ForeignAddress) -> Option<u64> {
        let _ = address;
        None
    }

    /// Release the foreign resource at `address`.
    ///
    /// For reference types this is the final release (decrement + deinit),
    /// for value types a direct destroy of the value. Called at most once
    /// per registered instance.
    fn destroy(&self, address: ForeignAddress);

    /// Whether the null address is a valid instance of this type.
    fn permits_null(&self) -> bool {
        false
    }
}

/// Shared handle to a type descriptor.
pub type SwiftTypeRef = Arc<dyn SwiftType>;

type DestroyFn = Box<dyn Fn(ForeignAddress) + Send + Sync>;
type RetainCountFn = Box<dyn Fn(ForeignAddress) -> u64 + Send + Sync>;

/// A [`SwiftType`] assembled from the downcalls a binding already has.
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    destroy: DestroyFn,
    retain_count: Option<RetainCountFn>,
    permits_null: bool,
}

impl TypeDescriptor {
    /// Descriptor for a value type with its own destroy routine.
    pub fn value<F>(name: impl Into<String>, destroy: F) -> Self
    where
        F: Fn(ForeignAddress) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Value,
            destroy: Box::new(destroy),
            retain_count: None,
            permits_null: false,
        }
    }

    /// Descriptor for a reference-counted class.
    ///
    /// `retain_count` is queried right before `release` to detect references
    /// that would outlive the arena.
    pub fn reference<R, F>(name: impl Into<String>, retain_count: R, release: F) -> Self
    where
        R: Fn(ForeignAddress) -> u64 + Send + Sync + 'static,
        F: Fn(ForeignAddress) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Reference,
            destroy: Box::new(release),
            retain_count: Some(Box::new(retain_count)),
            permits_null: false,
        }
    }

    /// Allow the null address (e.g. for empty value types).
    pub fn permitting_null(mut self) -> Self {
        self.permits_null = true;
        self
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> SwiftTypeRef {
        Arc::new(self)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("permits_null", &self.permits_null)
            .finish_non_exhaustive()
    }
}

impl SwiftType for TypeDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        self.kind
    }

    fn retain_count(&self, address: ForeignAddress) -> Option<u64> {
        self.retain_count.as_ref().map(|f| f(address))
    }

    fn destroy(&self, address: ForeignAddress) {
        (self.destroy)(address)
    }

    fn permits_null(&self) -> bool {
        self.permits_null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn value_descriptor_has_no_retain_count() {
        let ty = TypeDescriptor::value("Point", |_| {});
        assert_eq!(ty.kind(), TypeKind::Value);
        assert_eq!(ty.retain_count(ForeignAddress(8)), None);
        assert!(!ty.permits_null());
    }

    #[test]
    fn reference_descriptor_forwards_calls() {
        let released = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&released);
        let ty = TypeDescriptor::reference(
            "Counter",
            |addr| addr.get() as u64,
            move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert!(ty.kind().is_reference());
        assert_eq!(ty.retain_count(ForeignAddress(3)), Some(3));
        ty.destroy(ForeignAddress(3));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn permitting_null() {
        let ty = TypeDescriptor::value("Empty", |_| {}).permitting_null();
        assert!(ty.permits_null());
        assert!(format!("{ty:?}").contains("Empty"));
    }
}
