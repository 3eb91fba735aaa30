//! Core types shared across blockbridge components

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Address of a block on a device, in `[0, block_count)`.
///
/// Range invariants are the engine's responsibility; the bridge and the
/// registry pass block addresses through by value without checking them.
pub type BlockAddr = u32;

/// Opaque token identifying one block-device configuration.
///
/// Issued once at config-creation time and used as the registry key for the
/// lifetime of the config. Tokens are unique within the process and are
/// never reused, so a stale id held after teardown can only miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigId(u64);

static NEXT_CONFIG_ID: AtomicU64 = AtomicU64::new(1);

impl ConfigId {
    /// Issue a fresh, process-unique config id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONFIG_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw token value, for logging.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cfg-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ids_unique() {
        let a = ConfigId::next();
        let b = ConfigId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_config_id_display() {
        let id = ConfigId::next();
        assert_eq!(format!("{id}"), format!("cfg-{}", id.raw()));
    }
}
