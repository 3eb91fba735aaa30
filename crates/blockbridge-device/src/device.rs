//! Block-device boundary traits
//!
//! What the original engine sees as a table of four C function pointers is
//! expressed here as a fixed set of named thunk methods, resolved once at
//! registration time. Every thunk returns a [`Completion`] so a backend may
//! answer inline or hand the work to an async task.

use blockbridge_common::BlockAddr;
use bytes::Bytes;

use crate::completion::Completion;

/// Outcome of a read thunk: the status code plus the data when the code is
/// non-negative.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// Engine status code; negative on failure.
    pub code: i32,
    /// The bytes read. Must hold exactly the requested length when `code`
    /// is non-negative; ignored otherwise.
    pub data: Bytes,
}

impl ReadOutcome {
    /// Successful read carrying `data`.
    #[must_use]
    pub const fn ok(data: Bytes) -> Self {
        Self { code: 0, data }
    }

    /// Failed read with a negative status code and no data.
    #[must_use]
    pub const fn err(code: i32) -> Self {
        Self {
            code,
            data: Bytes::new(),
        }
    }
}

/// A storage backend servicing the engine's four block operations.
///
/// The engine issues at most one operation at a time per filesystem
/// instance and waits for it to resolve before issuing the next, so
/// implementations never see two thunks in flight for the same config.
/// A thunk must not call back into engine operations on its own config
/// before resolving; such re-entrancy is unsupported.
///
/// Negative status codes are passed through to the engine verbatim and
/// must come from the engine's code table (see `blockbridge_common::code`).
pub trait BlockDevice: Send + Sync {
    /// Read `len` bytes from `block` starting at byte offset `off`.
    fn read(&self, block: BlockAddr, off: u32, len: u32) -> Completion<ReadOutcome>;

    /// Program (write) `data` into `block` starting at byte offset `off`.
    ///
    /// The payload is owned, so it stays valid and unchanged for the full
    /// duration of the call, including across suspension.
    fn program(&self, block: BlockAddr, off: u32, data: Bytes) -> Completion<i32>;

    /// Erase `block`. The post-erase read value is defined and documented
    /// by the device, not by the bridge.
    fn erase(&self, block: BlockAddr) -> Completion<i32>;

    /// Flush any device-side buffering.
    fn sync(&self) -> Completion<i32>;
}

/// Host-side callback invoked once per in-use block during a
/// full-filesystem traversal.
///
/// Follows the same resolve protocol as the [`BlockDevice`] thunks. The
/// engine serializes traversal against its other block operations per
/// filesystem instance; the adapter layer does not.
pub trait BlockVisitor: Send + Sync {
    /// Visit one block address.
    fn visit(&self, block: BlockAddr) -> Completion<i32>;
}
