//! Deferred-completion wrapper device
//!
//! Wraps another device and resolves every thunk through the pending path
//! on a spawned task after a fixed delay. Hosts use it to simulate
//! high-latency backends; tests use it to exercise the same ordering
//! guarantees the bridge gives for inline resolution.

use std::sync::Arc;
use std::time::Duration;

use blockbridge_common::{code, BlockAddr};
use bytes::Bytes;

use crate::completion::Completion;
use crate::device::{BlockDevice, BlockVisitor, ReadOutcome};

/// Device wrapper that defers every operation by a fixed delay.
///
/// Thunks must be called from within a tokio runtime, since each one
/// spawns the task that eventually resolves the completion.
pub struct DelayedDevice<D> {
    inner: Arc<D>,
    delay: Duration,
}

impl<D> DelayedDevice<D> {
    /// Wrap `inner`, deferring each operation by `delay`.
    pub fn new(inner: Arc<D>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// The wrapped device.
    pub fn inner(&self) -> Arc<D> {
        Arc::clone(&self.inner)
    }
}

impl<D: BlockDevice + 'static> BlockDevice for DelayedDevice<D> {
    fn read(&self, block: BlockAddr, off: u32, len: u32) -> Completion<ReadOutcome> {
        let (tx, completion) = Completion::pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = inner
                .read(block, off, len)
                .wait()
                .await
                .unwrap_or_else(|| ReadOutcome::err(code::ERR_IO));
            tx.send(outcome).ok();
        });
        completion
    }

    fn program(&self, block: BlockAddr, off: u32, data: Bytes) -> Completion<i32> {
        let (tx, completion) = Completion::pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = inner
                .program(block, off, data)
                .wait()
                .await
                .unwrap_or(code::ERR_IO);
            tx.send(result).ok();
        });
        completion
    }

    fn erase(&self, block: BlockAddr) -> Completion<i32> {
        let (tx, completion) = Completion::pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = inner.erase(block).wait().await.unwrap_or(code::ERR_IO);
            tx.send(result).ok();
        });
        completion
    }

    fn sync(&self) -> Completion<i32> {
        let (tx, completion) = Completion::pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = inner.sync().wait().await.unwrap_or(code::ERR_IO);
            tx.send(result).ok();
        });
        completion
    }
}

impl<V: BlockVisitor + 'static> BlockVisitor for DelayedDevice<V> {
    fn visit(&self, block: BlockAddr) -> Completion<i32> {
        let (tx, completion) = Completion::pending();
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = inner.visit(block).wait().await.unwrap_or(code::ERR_IO);
            tx.send(result).ok();
        });
        completion
    }
}
