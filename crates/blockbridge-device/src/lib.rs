//! Blockbridge Device - Device-object abstraction
//!
//! This crate defines the boundary a storage backend implements so a
//! synchronous filesystem engine can be bridged onto it: the [`BlockDevice`]
//! trait with one thunk per block operation, the [`BlockVisitor`] trait for
//! block traversal, and the [`Completion`] type a thunk returns when its work
//! may finish either immediately or later.
//!
//! Two devices ship with the crate: [`MemoryBlockDevice`], an in-memory
//! reference backend, and [`DelayedDevice`], a wrapper that forces every
//! operation down the deferred-completion path.

pub mod completion;
pub mod delayed;
pub mod device;
pub mod mem;

pub use completion::Completion;
pub use delayed::DelayedDevice;
pub use device::{BlockDevice, BlockVisitor, ReadOutcome};
pub use mem::{DeviceOp, MemoryBlockDevice};
