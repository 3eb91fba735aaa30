//! Geometry/config builder
//!
//! Builds the fixed-layout configuration record the engine mounts against.
//! All geometry parameters collapse to the block size: read, program,
//! cache, and lookahead sizes are one value. The builder performs no
//! validation; a zero block size or block count is a caller error and must
//! be rejected before construction, not here.

/// Block-device configuration record.
///
/// The callback table the original environment installed alongside these
/// fields is the fixed set of [`BlockBridge`](crate::BlockBridge) methods,
/// dispatched through the registry by the config's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// Minimum read unit, equal to the block size.
    pub read_size: u32,
    /// Minimum program unit, equal to the block size.
    pub prog_size: u32,
    /// Size of an erasable block in bytes.
    pub block_size: u32,
    /// Number of blocks on the device.
    pub block_count: u32,
    /// Erase cycles before the engine moves metadata; -1 disables
    /// wear-tracking.
    pub block_cycles: i32,
    /// Cache size, equal to the block size.
    pub cache_size: u32,
    /// Lookahead buffer size, equal to the block size.
    pub lookahead_size: u32,
}

impl BlockConfig {
    /// Build a config with all geometry parameters collapsed to
    /// `block_size`.
    #[must_use]
    pub const fn new(block_size: u32, block_count: u32, block_cycles: i32) -> Self {
        Self {
            read_size: block_size,
            prog_size: block_size,
            block_size,
            block_count,
            block_cycles,
            cache_size: block_size,
            lookahead_size: block_size,
        }
    }

    /// Total device capacity in bytes.
    #[must_use]
    pub const fn capacity_bytes(&self) -> u64 {
        self.block_size as u64 * self.block_count as u64
    }
}
