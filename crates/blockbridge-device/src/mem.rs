//! In-memory reference block device
//!
//! Backs the engine with a sparse map of heap blocks. Blocks materialize
//! zero-filled on first touch and erase simply drops the block, so the
//! erase value of this device is 0x00. Every thunk resolves inline.

use std::collections::HashMap;

use blockbridge_common::{code, BlockAddr};
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::completion::Completion;
use crate::device::{BlockDevice, ReadOutcome};

/// One operation observed by the device, recorded in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOp {
    /// Read of `len` bytes at (`block`, `off`).
    Read {
        block: BlockAddr,
        off: u32,
        len: u32,
    },
    /// Program of `len` bytes at (`block`, `off`).
    Program {
        block: BlockAddr,
        off: u32,
        len: u32,
    },
    /// Erase of `block`.
    Erase { block: BlockAddr },
    /// Sync.
    Sync,
}

/// Sparse in-memory block device.
///
/// Accesses outside the device geometry fail with the engine's I/O code
/// rather than panicking, so a misbehaving engine surfaces as an ordinary
/// device error.
pub struct MemoryBlockDevice {
    block_size: u32,
    block_count: u32,
    blocks: Mutex<HashMap<BlockAddr, Vec<u8>>>,
    ops: Mutex<Vec<DeviceOp>>,
}

impl MemoryBlockDevice {
    /// Create a device with `block_count` blocks of `block_size` bytes,
    /// all reading as zero until first programmed.
    #[must_use]
    pub fn new(block_size: u32, block_count: u32) -> Self {
        Self {
            block_size,
            block_count,
            blocks: Mutex::new(HashMap::new()),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Block size in bytes.
    #[must_use]
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of blocks.
    #[must_use]
    pub const fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Operations observed so far, in issue order.
    #[must_use]
    pub fn ops(&self) -> Vec<DeviceOp> {
        self.ops.lock().clone()
    }

    /// Number of blocks currently materialized (programmed and not erased).
    #[must_use]
    pub fn materialized_blocks(&self) -> usize {
        self.blocks.lock().len()
    }

    fn in_bounds(&self, block: BlockAddr, off: u32, len: u32) -> bool {
        block < self.block_count
            && u64::from(off) + u64::from(len) <= u64::from(self.block_size)
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read(&self, block: BlockAddr, off: u32, len: u32) -> Completion<ReadOutcome> {
        self.ops.lock().push(DeviceOp::Read { block, off, len });
        if !self.in_bounds(block, off, len) {
            debug!(block, off, len, "read outside device geometry");
            return Completion::ready(ReadOutcome::err(code::ERR_IO));
        }

        let blocks = self.blocks.lock();
        let start = off as usize;
        let end = start + len as usize;
        let data = match blocks.get(&block) {
            Some(bytes) => Bytes::copy_from_slice(&bytes[start..end]),
            // Untouched block: reads as the erase value.
            None => Bytes::from(vec![0u8; len as usize]),
        };
        Completion::ready(ReadOutcome::ok(data))
    }

    fn program(&self, block: BlockAddr, off: u32, data: Bytes) -> Completion<i32> {
        self.ops.lock().push(DeviceOp::Program {
            block,
            off,
            len: data.len() as u32,
        });
        if !self.in_bounds(block, off, data.len() as u32) {
            debug!(block, off, len = data.len(), "program outside device geometry");
            return Completion::ready(code::ERR_IO);
        }

        let mut blocks = self.blocks.lock();
        let bytes = blocks
            .entry(block)
            .or_insert_with(|| vec![0u8; self.block_size as usize]);
        let start = off as usize;
        bytes[start..start + data.len()].copy_from_slice(&data);
        Completion::ready(code::OK)
    }

    fn erase(&self, block: BlockAddr) -> Completion<i32> {
        self.ops.lock().push(DeviceOp::Erase { block });
        if block >= self.block_count {
            debug!(block, "erase outside device geometry");
            return Completion::ready(code::ERR_IO);
        }

        self.blocks.lock().remove(&block);
        Completion::ready(code::OK)
    }

    fn sync(&self) -> Completion<i32> {
        self.ops.lock().push(DeviceOp::Sync);
        Completion::ready(code::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unwritten_block_reads_zero() {
        let dev = MemoryBlockDevice::new(16, 4);
        let outcome = dev.read(2, 0, 16).wait().await.unwrap();
        assert_eq!(outcome.code, code::OK);
        assert_eq!(outcome.data.as_ref(), &[0u8; 16]);
        assert_eq!(dev.materialized_blocks(), 0);
    }

    #[tokio::test]
    async fn test_program_then_read() {
        let dev = MemoryBlockDevice::new(16, 4);
        let payload = Bytes::from_static(b"0123456789abcdef");
        assert_eq!(dev.program(1, 0, payload.clone()).wait().await, Some(code::OK));

        let outcome = dev.read(1, 0, 16).wait().await.unwrap();
        assert_eq!(outcome.code, code::OK);
        assert_eq!(outcome.data, payload);
    }

    #[tokio::test]
    async fn test_partial_program_preserves_rest() {
        let dev = MemoryBlockDevice::new(8, 2);
        assert_eq!(
            dev.program(0, 2, Bytes::from_static(b"xyz")).wait().await,
            Some(code::OK)
        );

        let outcome = dev.read(0, 0, 8).wait().await.unwrap();
        assert_eq!(outcome.data.as_ref(), b"\0\0xyz\0\0\0");
    }

    #[tokio::test]
    async fn test_erase_restores_zeros() {
        let dev = MemoryBlockDevice::new(8, 2);
        assert_eq!(
            dev.program(1, 0, Bytes::from_static(b"AAAAAAAA")).wait().await,
            Some(code::OK)
        );
        assert_eq!(dev.erase(1).wait().await, Some(code::OK));

        let outcome = dev.read(1, 0, 8).wait().await.unwrap();
        assert_eq!(outcome.data.as_ref(), &[0u8; 8]);
        assert_eq!(dev.materialized_blocks(), 0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_fails_with_io() {
        let dev = MemoryBlockDevice::new(8, 2);
        assert_eq!(dev.read(2, 0, 8).wait().await.unwrap().code, code::ERR_IO);
        assert_eq!(
            dev.program(0, 6, Bytes::from_static(b"toolong")).wait().await,
            Some(code::ERR_IO)
        );
        assert_eq!(dev.erase(9).wait().await, Some(code::ERR_IO));
    }

    #[tokio::test]
    async fn test_op_log_records_issue_order() {
        let dev = MemoryBlockDevice::new(8, 2);
        let _ = dev.read(0, 0, 8).wait().await;
        let _ = dev.program(0, 0, Bytes::from_static(b"x")).wait().await;
        let _ = dev.sync().wait().await;

        assert_eq!(
            dev.ops(),
            vec![
                DeviceOp::Read { block: 0, off: 0, len: 8 },
                DeviceOp::Program { block: 0, off: 0, len: 1 },
                DeviceOp::Sync,
            ]
        );
    }
}
