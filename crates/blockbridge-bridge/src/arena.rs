//! Checked handle arena
//!
//! The engine's opaque objects (filesystem instance, file handle, dir
//! handle, info record) and raw scratch buffers live in zero-initialized
//! regions owned by this arena. What the original environment handled with
//! bare malloc/free becomes a handle table with single-owner semantics:
//! regions are addressed by opaque tokens, freed explicitly exactly once,
//! and any use of an unknown or already-freed handle is a checked error
//! instead of silent corruption.
//!
//! The arena never interprets region contents; the engine populates and
//! mutates them through the access helpers.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Largest raw allocation the arena will grant, in bytes.
///
/// Requests above the cap fail with [`ArenaError::AllocTooLarge`] so an
/// absurd size is a detectable failure rather than an allocator abort.
pub const MAX_ALLOC: usize = 64 * 1024 * 1024;

/// Fixed region sizes for the engine's opaque objects. The engine treats
/// the regions as scratch space; only the sizes matter here.
const FILESYSTEM_REGION: usize = 512;
const FILE_REGION: usize = 128;
const DIR_REGION: usize = 128;
const INFO_REGION: usize = 264;

/// Arena error
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Requested allocation exceeds the arena cap
    #[error("allocation of {0} bytes exceeds the {MAX_ALLOC}-byte cap")]
    AllocTooLarge(usize),

    /// Handle is unknown, foreign, or already freed
    #[error("unknown or already freed handle: {0}")]
    UnknownHandle(RawHandle),
}

/// Result type for arena operations
pub type ArenaResult<T> = Result<T, ArenaError>;

/// What a handle's region holds, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Filesystem instance state
    Filesystem,
    /// Open-file state
    File,
    /// Open-directory state
    Dir,
    /// Stat/info record
    Info,
    /// Caller-sized scratch region
    Raw,
}

/// Opaque token addressing one live arena region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(u64);

impl std::fmt::Display for RawHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

struct Region {
    kind: HandleKind,
    data: Mutex<Vec<u8>>,
}

/// Handle table with single-owner, free-exactly-once semantics.
#[derive(Default)]
pub struct HandleArena {
    regions: DashMap<u64, Region>,
    next: AtomicU64,
}

impl HandleArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, kind: HandleKind, size: usize) -> RawHandle {
        let token = self.next.fetch_add(1, Ordering::Relaxed);
        self.regions.insert(
            token,
            Region {
                kind,
                data: Mutex::new(vec![0u8; size]),
            },
        );
        RawHandle(token)
    }

    /// Allocate a zero-initialized scratch region of exactly `size` bytes.
    ///
    /// `allocate(0)` returns a usable zero-length region; sizes above
    /// [`MAX_ALLOC`] fail.
    pub fn allocate(&self, size: usize) -> ArenaResult<RawHandle> {
        if size > MAX_ALLOC {
            debug!(size, "refusing oversized allocation");
            return Err(ArenaError::AllocTooLarge(size));
        }
        Ok(self.insert(HandleKind::Raw, size))
    }

    /// Allocate a filesystem-instance region.
    #[must_use]
    pub fn new_filesystem(&self) -> RawHandle {
        self.insert(HandleKind::Filesystem, FILESYSTEM_REGION)
    }

    /// Allocate a file-handle region.
    #[must_use]
    pub fn new_file(&self) -> RawHandle {
        self.insert(HandleKind::File, FILE_REGION)
    }

    /// Allocate a dir-handle region.
    #[must_use]
    pub fn new_dir(&self) -> RawHandle {
        self.insert(HandleKind::Dir, DIR_REGION)
    }

    /// Allocate an info-record region.
    #[must_use]
    pub fn new_info(&self) -> RawHandle {
        self.insert(HandleKind::Info, INFO_REGION)
    }

    /// Release a region.
    ///
    /// Freeing an unknown or already-freed handle fails loudly with
    /// [`ArenaError::UnknownHandle`]; it is never a silent no-op.
    pub fn free(&self, handle: RawHandle) -> ArenaResult<()> {
        self.regions
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(ArenaError::UnknownHandle(handle))
    }

    /// Kind of a live region.
    pub fn kind(&self, handle: RawHandle) -> ArenaResult<HandleKind> {
        self.regions
            .get(&handle.0)
            .map(|region| region.kind)
            .ok_or(ArenaError::UnknownHandle(handle))
    }

    /// Size of a live region in bytes.
    pub fn size(&self, handle: RawHandle) -> ArenaResult<usize> {
        self.regions
            .get(&handle.0)
            .map(|region| region.data.lock().len())
            .ok_or(ArenaError::UnknownHandle(handle))
    }

    /// Run `f` over a live region's bytes.
    pub fn with_bytes<R>(&self, handle: RawHandle, f: impl FnOnce(&[u8]) -> R) -> ArenaResult<R> {
        let region = self
            .regions
            .get(&handle.0)
            .ok_or(ArenaError::UnknownHandle(handle))?;
        let data = region.data.lock();
        Ok(f(&data))
    }

    /// Run `f` over a live region's bytes, mutably.
    pub fn with_bytes_mut<R>(
        &self,
        handle: RawHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> ArenaResult<R> {
        let region = self
            .regions
            .get(&handle.0)
            .ok_or(ArenaError::UnknownHandle(handle))?;
        let mut data = region.data.lock();
        Ok(f(&mut data))
    }

    /// Number of live regions.
    #[must_use]
    pub fn live_regions(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_zero_initialized() {
        let arena = HandleArena::new();
        let handle = arena.allocate(32).unwrap();
        assert_eq!(arena.size(handle), Ok(32));
        arena
            .with_bytes(handle, |bytes| assert!(bytes.iter().all(|&b| b == 0)))
            .unwrap();
    }

    #[test]
    fn test_allocate_zero_length() {
        let arena = HandleArena::new();
        let handle = arena.allocate(0).unwrap();
        assert_eq!(arena.size(handle), Ok(0));
        assert_eq!(arena.free(handle), Ok(()));
    }

    #[test]
    fn test_allocate_huge_fails_cleanly() {
        let arena = HandleArena::new();
        let result = arena.allocate(usize::MAX);
        assert_eq!(result, Err(ArenaError::AllocTooLarge(usize::MAX)));
    }

    #[test]
    fn test_double_free_fails_loudly() {
        let arena = HandleArena::new();
        let handle = arena.allocate(8).unwrap();
        assert_eq!(arena.free(handle), Ok(()));
        assert_eq!(arena.free(handle), Err(ArenaError::UnknownHandle(handle)));
    }

    #[test]
    fn test_use_after_free_is_checked() {
        let arena = HandleArena::new();
        let handle = arena.allocate(8).unwrap();
        arena.free(handle).unwrap();
        assert_eq!(
            arena.with_bytes(handle, <[u8]>::len),
            Err(ArenaError::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_typed_regions() {
        let arena = HandleArena::new();
        let fs = arena.new_filesystem();
        let file = arena.new_file();
        let dir = arena.new_dir();
        let info = arena.new_info();

        assert_eq!(arena.kind(fs), Ok(HandleKind::Filesystem));
        assert_eq!(arena.kind(file), Ok(HandleKind::File));
        assert_eq!(arena.kind(dir), Ok(HandleKind::Dir));
        assert_eq!(arena.kind(info), Ok(HandleKind::Info));
        assert_eq!(arena.live_regions(), 4);
    }

    #[test]
    fn test_region_contents_persist() {
        let arena = HandleArena::new();
        let handle = arena.allocate(4).unwrap();
        arena
            .with_bytes_mut(handle, |bytes| bytes.copy_from_slice(b"abcd"))
            .unwrap();
        let copied = arena
            .with_bytes(handle, |bytes| bytes.to_vec())
            .unwrap();
        assert_eq!(copied, b"abcd");
    }
}
