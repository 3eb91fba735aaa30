//! Blockbridge - Asynchronous block-device bridge
//!
//! This crate lets a synchronous, callback-driven filesystem engine run its
//! block operations against a backend whose I/O is inherently asynchronous.
//! The engine issues a read, program, erase, or sync and must not proceed
//! until the call fully resolves; the backend may service the call out of
//! band. The bridge suspends the calling task at exactly that boundary and
//! resumes it with the final integer status, so the engine never observes
//! partial completion.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Filesystem engine│  (issues one op at a time per instance)
//! └────────┬─────────┘
//!          │ read/program/erase/sync (ConfigId + args)
//! ┌────────▼─────────┐
//! │   BlockBridge    │  lookup → suspend → resolve → i32
//! │  DeviceRegistry  │  ConfigId → Arc<dyn BlockDevice>
//! └────────┬─────────┘
//!          │ thunks returning Completion
//! ┌────────▼─────────┐
//! │  Host device     │  (memory, network, browser storage, ...)
//! └──────────────────┘
//! ```
//!
//! Operations on distinct configs are fully independent; the registry is
//! the only shared structure and is keyed by the opaque [`ConfigId`]
//! issued at config-creation time.
//!
//! [`ConfigId`]: blockbridge_common::ConfigId

pub mod arena;
pub mod bridge;
pub mod config;
pub mod host;
pub mod registry;
pub mod traverse;

pub use arena::{ArenaError, ArenaResult, HandleArena, HandleKind, RawHandle, MAX_ALLOC};
pub use bridge::BlockBridge;
pub use config::BlockConfig;
pub use host::{sleep, Host};
pub use registry::DeviceRegistry;
pub use traverse::TraversalCallback;
