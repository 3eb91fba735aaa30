//! Traversal callback adapter
//!
//! During a full-filesystem traversal the engine invokes a fifth callback
//! once per in-use block, outside the four block operations. The adapter
//! binds that callback to a config and translates each invocation through
//! the same lookup, suspend, resolve protocol as the call bridge: a missing
//! visitor yields the I/O code, everything else passes through verbatim.
//!
//! The adapter does not serialize traversal against concurrent block
//! operations on the same config; the engine is expected to do that per
//! filesystem instance. Visits resolve in issue order because each one is
//! awaited to completion before the engine issues the next.

use std::sync::Arc;

use blockbridge_common::{code, BlockAddr, ConfigId};
use tracing::{debug, warn};

use crate::registry::DeviceRegistry;

/// Block-visiting callback bound to one config, handed to engine calls
/// that traverse all in-use blocks.
#[derive(Clone)]
pub struct TraversalCallback {
    registry: Arc<DeviceRegistry>,
    config: ConfigId,
}

impl TraversalCallback {
    /// Bind a callback for `config`, resolving visitors through `registry`.
    #[must_use]
    pub fn new(registry: Arc<DeviceRegistry>, config: ConfigId) -> Self {
        Self { registry, config }
    }

    /// The config this callback is bound to.
    #[must_use]
    pub const fn config(&self) -> ConfigId {
        self.config
    }

    /// Deliver one block address to the registered visitor and resolve
    /// its completion.
    pub async fn visit(&self, block: BlockAddr) -> i32 {
        let Some(visitor) = self.registry.visitor(self.config) else {
            debug!(config = %self.config, block, "traversal visit on unregistered config");
            return code::ERR_IO;
        };

        match visitor.visit(block).wait().await {
            Some(result) => result,
            None => {
                warn!(
                    config = %self.config,
                    block,
                    "traversal completion dropped without resolving"
                );
                code::ERR_IO
            }
        }
    }
}
