//! Synchronous-to-asynchronous call bridge
//!
//! Each of the four block operations looks up the device registered for
//! the config, suspends the calling task while the device thunk resolves
//! (inline or out of band), and resumes with the final integer status.
//! From the engine's viewpoint the call is strictly synchronous: it never
//! proceeds before resolution, and resolution order matches issue order
//! because each operation is awaited to completion before the next is
//! issued.
//!
//! Negative device codes pass through verbatim. The only code the bridge
//! injects itself is the I/O code for a config with no registered device;
//! in that case no buffer is touched.

use std::sync::Arc;

use blockbridge_common::{code, BlockAddr, ConfigId};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::registry::DeviceRegistry;

/// The four block-operation entry points the engine calls through.
///
/// Cheap to clone; all clones share one registry. There is no cancellation
/// path: once an operation is issued the caller must wait for resolution.
#[derive(Clone)]
pub struct BlockBridge {
    registry: Arc<DeviceRegistry>,
}

impl BlockBridge {
    /// Create a bridge dispatching through `registry`.
    #[must_use]
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this bridge dispatches through.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Read `buf.len()` bytes from `block` at byte offset `off`.
    ///
    /// On a non-negative status the buffer holds exactly the bytes the
    /// device returned; on any failure, including an unregistered config
    /// or a device resolving with short data, the buffer is untouched.
    pub async fn read(
        &self,
        config: ConfigId,
        block: BlockAddr,
        off: u32,
        buf: &mut [u8],
    ) -> i32 {
        let Some(device) = self.registry.lookup(config) else {
            debug!(%config, block, "read on unregistered config");
            return code::ERR_IO;
        };

        let len = buf.len() as u32;
        let Some(outcome) = device.read(block, off, len).wait().await else {
            warn!(%config, block, "read completion dropped without resolving");
            return code::ERR_IO;
        };
        if code::is_err(outcome.code) {
            return outcome.code;
        }
        if outcome.data.len() != buf.len() {
            warn!(
                %config,
                block,
                expected = buf.len(),
                got = outcome.data.len(),
                "device resolved read with short data"
            );
            return code::ERR_IO;
        }

        buf.copy_from_slice(&outcome.data);
        outcome.code
    }

    /// Program `data` into `block` at byte offset `off`.
    ///
    /// The payload is copied into an owned buffer before dispatch, so it
    /// stays valid and unchanged across suspension regardless of what the
    /// caller does afterwards.
    pub async fn program(
        &self,
        config: ConfigId,
        block: BlockAddr,
        off: u32,
        data: &[u8],
    ) -> i32 {
        let Some(device) = self.registry.lookup(config) else {
            debug!(%config, block, "program on unregistered config");
            return code::ERR_IO;
        };

        let payload = Bytes::copy_from_slice(data);
        match device.program(block, off, payload).wait().await {
            Some(result) => result,
            None => {
                warn!(%config, block, "program completion dropped without resolving");
                code::ERR_IO
            }
        }
    }

    /// Erase `block`.
    pub async fn erase(&self, config: ConfigId, block: BlockAddr) -> i32 {
        let Some(device) = self.registry.lookup(config) else {
            debug!(%config, block, "erase on unregistered config");
            return code::ERR_IO;
        };

        match device.erase(block).wait().await {
            Some(result) => result,
            None => {
                warn!(%config, block, "erase completion dropped without resolving");
                code::ERR_IO
            }
        }
    }

    /// Flush device-side buffering for `config`.
    pub async fn sync(&self, config: ConfigId) -> i32 {
        let Some(device) = self.registry.lookup(config) else {
            debug!(%config, "sync on unregistered config");
            return code::ERR_IO;
        };

        match device.sync().wait().await {
            Some(result) => result,
            None => {
                warn!(%config, "sync completion dropped without resolving");
                code::ERR_IO
            }
        }
    }
}
