//! Process-wide cache of type descriptors.
//!
//! Bindings resolve each Swift type's descriptor once (typically by symbol
//! or mangled-name lookup) and read it many times afterwards. The registry
//! is populated lazily and is not on the disposal path: arenas and cleanups
//! hold their own `Arc` to the descriptor.

use std::sync::{OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::metadata::SwiftTypeRef;

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Name-keyed, read-mostly map of [`SwiftTypeRef`]s.
///
/// Insertion order is preserved so diagnostics list types in the order the
/// bindings first touched them.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<IndexMap<String, SwiftTypeRef>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Look up a descriptor by type name.
    pub fn get(&self, name: &str) -> Option<SwiftTypeRef> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Return the descriptor registered under `name`, creating it with
    /// `make` on first use. `make` runs at most once per name.
    pub fn get_or_register<F>(&self, name: &str, make: F) -> SwiftTypeRef
    where
        F: FnOnce() -> SwiftTypeRef,
    {
        if let Some(ty) = self.get(name) {
            return ty;
        }
        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the read and write locks.
        types
            .entry(name.to_owned())
            .or_insert_with(|| {
                tracing::debug!(type_name = name, "registering swift type descriptor");
                make()
            })
            .clone()
    }

    /// Register `ty` under its own name.
    ///
    /// If the name is taken the existing descriptor wins and is returned.
    pub fn register(&self, ty: SwiftTypeRef) -> SwiftTypeRef {
        let name = ty.name().to_owned();
        self.get_or_register(&name, move || ty)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered type names in first-registration order.
    pub fn names(&self) -> Vec<String> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
