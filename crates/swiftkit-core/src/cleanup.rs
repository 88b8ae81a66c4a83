//! The disposal action an arena runs for one registered instance.
//!
//! An [`InstanceCleanup`] captures exactly what is needed to release one
//! foreign resource: its address, its type descriptor and a handle to its
//! liveness flag. It never refers back to the wrapper, so an auto arena can
//! observe the wrapper becoming unreachable while the cleanup is pending.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::address::ForeignAddress;
use crate::error::DisposalError;
use crate::liveness::LivenessFlag;
use crate::metadata::{SwiftTypeRef, TypeKind};

/// One-shot release of a foreign instance.
///
/// Running consumes the action, so each cleanup runs at most once. Arenas
/// own their pending cleanups and are responsible for running every one of
/// them exactly once at the right time.
#[derive(Debug)]
#[must_use = "a cleanup that is dropped without running leaks its resource"]
pub struct InstanceCleanup {
    address: ForeignAddress,
    ty: SwiftTypeRef,
    liveness: LivenessFlag,
}

// Compile-time assertion: cleanups move to the reclamation thread.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<InstanceCleanup>();
};

impl InstanceCleanup {
    /// Capture the release of the instance at `address`. No side effects.
    pub fn new(address: ForeignAddress, ty: SwiftTypeRef, liveness: LivenessFlag) -> Self {
        Self {
            address,
            ty,
            liveness,
        }
    }

    /// Address of the instance this cleanup releases.
    pub fn address(&self) -> ForeignAddress {
        self.address
    }

    /// Name of the instance's Swift type.
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Destruction strategy of the instance's type.
    pub fn kind(&self) -> TypeKind {
        self.ty.kind()
    }

    /// The liveness flag this cleanup will set.
    pub fn liveness(&self) -> &LivenessFlag {
        &self.liveness
    }

    /// Release the instance.
    ///
    /// 1. Marks the instance destroyed, so concurrent `ensure_alive` callers
    ///    see it dead before its memory goes away.
    /// 2. For reference types, reads the retain count; anything above 1 means
    ///    a reference escaped the arena. The destroy routine is then skipped
    ///    and the object leaked rather than freed under a live reference.
    /// 3. Calls the type's destroy routine.
    pub fn run(self) -> Result<(), DisposalError> {
        self.liveness.mark_destroyed();

        if self.ty.kind().is_reference() {
            if let Some(retain_count) = self.ty.retain_count(self.address) {
                if retain_count > 1 {
                    return Err(DisposalError::UnexpectedRetainCount {
                        type_name: self.ty.name().to_owned(),
                        address: self.address,
                        retain_count,
                    });
                }
            }
        }

        tracing::trace!(
            type_name = self.ty.name(),
            address = %self.address,
            kind = ?self.ty.kind(),
            "destroying swift instance"
        );
        self.ty.destroy(self.address);
        Ok(())
    }

    /// Like [`run`](Self::run), but a panicking destroy routine is reported
    /// as [`DisposalError::DestroyPanicked`] instead of unwinding.
    pub fn run_catching(self) -> Result<(), DisposalError> {
        let type_name = self.ty.name().to_owned();
        let address = self.address;
        match panic::catch_unwind(AssertUnwindSafe(move || self.run())) {
            Ok(result) => result,
            Err(payload) => Err(DisposalError::DestroyPanicked {
                type_name,
                address,
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

/// Extract a printable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SwiftType;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Probe {
        kind: TypeKind,
        retain_count: AtomicU64,
        destroyed: AtomicUsize,
        flag_seen_destroyed: AtomicUsize,
        flag: LivenessFlag,
        panics: bool,
    }

    impl Probe {
        fn new(kind: TypeKind, flag: &LivenessFlag) -> Arc<Self> {
            Arc::new(Self {
                kind,
                retain_count: AtomicU64::new(1),
                destroyed: AtomicUsize::new(0),
                flag_seen_destroyed: AtomicUsize::new(0),
                flag: flag.clone(),
                panics: false,
            })
        }
    }

    impl SwiftType for Probe {
        fn name(&self) -> &str {
            "Probe"
        }

        fn kind(&self) -> TypeKind {
            self.kind
        }

        fn retain_count(&self, _address: ForeignAddress) -> Option<u64> {
            Some(self.retain_count.load(Ordering::SeqCst))
        }

        fn destroy(&self, _address: ForeignAddress) {
            if self.flag.is_destroyed() {
                self.flag_seen_destroyed.fetch_add(1, Ordering::SeqCst);
            }
            if self.panics {
                panic!("destroy exploded");
            }
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn run_destroys_and_marks_dead_first() {
        let flag = LivenessFlag::new();
        let probe = Probe::new(TypeKind::Reference, &flag);
        let cleanup = InstanceCleanup::new(ForeignAddress(0x10), probe.clone(), flag.clone());
        assert_eq!(cleanup.type_name(), "Probe");
        cleanup.run().unwrap();
        assert!(flag.is_destroyed());
        assert_eq!(probe.destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(probe.flag_seen_destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn over_retained_reference_is_leaked() {
        let flag = LivenessFlag::new();
        let probe = Probe::new(TypeKind::Reference, &flag);
        probe.retain_count.store(2, Ordering::SeqCst);
        let cleanup = InstanceCleanup::new(ForeignAddress(0x20), probe.clone(), flag.clone());
        let err = cleanup.run().unwrap_err();
        assert_eq!(
            err,
            DisposalError::UnexpectedRetainCount {
                type_name: "Probe".into(),
                address: ForeignAddress(0x20),
                retain_count: 2,
            }
        );
        // Flag is set even though the destroy routine never ran.
        assert!(flag.is_destroyed());
        assert_eq!(probe.destroyed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn value_types_skip_retain_check() {
        let flag = LivenessFlag::new();
        let probe = Probe::new(TypeKind::Value, &flag);
        probe.retain_count.store(5, Ordering::SeqCst);
        InstanceCleanup::new(ForeignAddress(0x30), probe.clone(), flag.clone())
            .run()
            .unwrap();
        assert_eq!(probe.destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn run_catching_reports_panics() {
        let flag = LivenessFlag::new();
        let probe = Arc::new(Probe {
            kind: TypeKind::Value,
            retain_count: AtomicU64::new(1),
            destroyed: AtomicUsize::new(0),
            flag_seen_destroyed: AtomicUsize::new(0),
            flag: flag.clone(),
            panics: true,
        });
        let err = InstanceCleanup::new(ForeignAddress(0x40), probe, flag.clone())
            .run_catching()
            .unwrap_err();
        match err {
            DisposalError::DestroyPanicked {
                type_name,
                address,
                message,
            } => {
                assert_eq!(type_name, "Probe");
                assert_eq!(address, ForeignAddress(0x40));
                assert_eq!(message, "destroy exploded");
            }
            other => panic!("expected DestroyPanicked, got {other:?}"),
        }
        assert!(flag.is_destroyed());
    }

    #[test]
    fn panic_message_handles_owned_strings() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
