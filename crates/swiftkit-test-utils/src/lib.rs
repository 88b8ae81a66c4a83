//! Test utilities and mock Swift types for SwiftKit development.
//!
//! Provides a fake Swift heap ([`MockHeap`], [`MockRuntime`]) that tracks
//! retain counts and detects invalid frees, mock [`SwiftType`] descriptors,
//! and small wrappers ([`FakeSwiftClass`], [`FakeSwiftStruct`],
//! [`FakeInstance`]) shaped like generated bindings.
//!
//! [`SwiftType`]: swiftkit_core::SwiftType

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::time::{Duration, Instant};

pub mod fakes;
pub mod heap;
pub mod slots;
pub mod types;

pub use fakes::{FakeInstance, FakeSwiftClass, FakeSwiftStruct};
pub use heap::{MockHeap, MockRuntime};
pub use slots::SlotTable;
pub use types::{CountingType, MockClassType, MockStructType};

/// Poll `cond` until it holds or `timeout` passes. Returns the final result.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
